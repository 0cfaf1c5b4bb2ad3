//! Protobuf wire-format reader.
//!
//! Varints use the same 7-bits-per-byte little-endian encoding as ULEB128,
//! limited to 10 bytes (64 bits).

use super::ExportError;

/// Wire type of a field, from the low three bits of its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint,
    Fixed64,
    LengthDelimited,
    Fixed32,
}

/// Cursor over one encoded message.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Decode a base-128 varint.
    pub fn read_varint(&mut self) -> Result<u64, ExportError> {
        let start = self.pos;
        let mut result: u64 = 0;
        let mut shift: u32 = 0;

        loop {
            let Some(&byte) = self.data.get(self.pos) else {
                return Err(ExportError::Truncated {
                    offset: self.pos,
                    expected: 1,
                    available: 0,
                });
            };
            self.pos += 1;

            let low_bits = (byte & 0x7F) as u64;
            if shift >= 64 || (shift == 63 && low_bits > 1) {
                return Err(ExportError::VarintOverflow(start));
            }
            result |= low_bits << shift;
            shift += 7;

            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
    }

    /// Read the next field tag, or `None` at the end of the message.
    pub fn read_tag(&mut self) -> Result<Option<(u64, WireType)>, ExportError> {
        if self.is_empty() {
            return Ok(None);
        }
        let offset = self.pos;
        let tag = self.read_varint()?;
        let field = tag >> 3;
        if field == 0 {
            return Err(ExportError::InvalidFieldNumber(offset));
        }
        let wire_type = match (tag & 0x7) as u8 {
            0 => WireType::Varint,
            1 => WireType::Fixed64,
            2 => WireType::LengthDelimited,
            5 => WireType::Fixed32,
            other => {
                return Err(ExportError::UnsupportedWireType { field, wire_type: other, offset })
            }
        };
        Ok(Some((field, wire_type)))
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ExportError> {
        let available = self.data.len() - self.pos;
        if len > available {
            return Err(ExportError::Truncated { offset: self.pos, expected: len, available });
        }
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    /// Read a length-delimited payload (string, bytes or nested message).
    pub fn read_bytes(&mut self) -> Result<&'a [u8], ExportError> {
        let len = self.read_varint()?;
        let len = usize::try_from(len).map_err(|_| ExportError::Truncated {
            offset: self.pos,
            expected: usize::MAX,
            available: self.data.len() - self.pos,
        })?;
        self.take(len)
    }

    pub fn read_string(&mut self, field: &'static str) -> Result<String, ExportError> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ExportError::InvalidUtf8 { field })
    }

    /// Skip a field's payload.
    pub fn skip(&mut self, wire_type: WireType) -> Result<(), ExportError> {
        match wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::Fixed64 => {
                self.take(8)?;
            }
            WireType::LengthDelimited => {
                self.read_bytes()?;
            }
            WireType::Fixed32 => {
                self.take(4)?;
            }
        }
        Ok(())
    }
}
