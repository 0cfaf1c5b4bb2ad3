//! The subset of the BinExport2 message the viewer reads.
//!
//! Field numbers:
//! - `BinExport2`: `meta_information = 1`, `call_graph = 8`
//! - `Meta`: `executable_name = 1`, `executable_id = 2`,
//!   `architecture_name = 3`, `timestamp = 4`
//! - `CallGraph`: `vertex = 1`, `edge = 2`
//! - `Vertex`: `address = 1`, `type = 2`, `mangled_name = 3`,
//!   `demangled_name = 4`, `library_index = 5`, `module_index = 6`
//!
//! Repeated occurrences of a singular message field merge, as protobuf
//! parsers do.

use serde::{Deserialize, Serialize};

use super::wire::{WireReader, WireType};
use super::ExportError;

/// Export-level metadata describing the exported executable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportMeta {
    pub executable_name: Option<String>,
    /// Usually the hex SHA-256 of the executable.
    pub executable_id: Option<String>,
    pub architecture_name: Option<String>,
    /// Seconds since the Unix epoch.
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VertexType {
    #[default]
    Normal,
    Library,
    Imported,
    Thunk,
    Invalid,
}

impl VertexType {
    fn from_wire(value: u64) -> Self {
        match value {
            1 => VertexType::Library,
            2 => VertexType::Imported,
            3 => VertexType::Thunk,
            4 => VertexType::Invalid,
            _ => VertexType::Normal,
        }
    }
}

/// A function node of the call graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub address: Option<u64>,
    pub vertex_type: VertexType,
    pub mangled_name: Option<String>,
    pub demangled_name: Option<String>,
    pub library_index: Option<i32>,
    pub module_index: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallGraph {
    pub vertices: Vec<Vertex>,
    /// Edges are not needed for name resolution; only counted.
    pub edge_count: usize,
}

/// Decoded call-graph export of one binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinExport {
    pub meta: ExportMeta,
    pub call_graph: Option<CallGraph>,
}

impl BinExport {
    pub fn decode(data: &[u8]) -> Result<Self, ExportError> {
        let mut reader = WireReader::new(data);
        let mut export = BinExport::default();

        while let Some((field, wire_type)) = reader.read_tag()? {
            match (field, wire_type) {
                (1, WireType::LengthDelimited) => {
                    decode_meta(reader.read_bytes()?, &mut export.meta)?;
                }
                (8, WireType::LengthDelimited) => {
                    let graph = export.call_graph.get_or_insert_with(CallGraph::default);
                    decode_call_graph(reader.read_bytes()?, graph)?;
                }
                (_, other) => reader.skip(other)?,
            }
        }

        Ok(export)
    }
}

fn decode_meta(data: &[u8], meta: &mut ExportMeta) -> Result<(), ExportError> {
    let mut reader = WireReader::new(data);
    while let Some((field, wire_type)) = reader.read_tag()? {
        match (field, wire_type) {
            (1, WireType::LengthDelimited) => {
                meta.executable_name = Some(reader.read_string("executable_name")?);
            }
            (2, WireType::LengthDelimited) => {
                meta.executable_id = Some(reader.read_string("executable_id")?);
            }
            (3, WireType::LengthDelimited) => {
                meta.architecture_name = Some(reader.read_string("architecture_name")?);
            }
            (4, WireType::Varint) => meta.timestamp = Some(reader.read_varint()? as i64),
            (_, other) => reader.skip(other)?,
        }
    }
    Ok(())
}

fn decode_call_graph(data: &[u8], graph: &mut CallGraph) -> Result<(), ExportError> {
    let mut reader = WireReader::new(data);
    while let Some((field, wire_type)) = reader.read_tag()? {
        match (field, wire_type) {
            (1, WireType::LengthDelimited) => {
                graph.vertices.push(decode_vertex(reader.read_bytes()?)?);
            }
            (2, WireType::LengthDelimited) => {
                reader.read_bytes()?;
                graph.edge_count += 1;
            }
            (_, other) => reader.skip(other)?,
        }
    }
    Ok(())
}

fn decode_vertex(data: &[u8]) -> Result<Vertex, ExportError> {
    let mut reader = WireReader::new(data);
    let mut vertex = Vertex::default();
    while let Some((field, wire_type)) = reader.read_tag()? {
        match (field, wire_type) {
            (1, WireType::Varint) => vertex.address = Some(reader.read_varint()?),
            (2, WireType::Varint) => {
                vertex.vertex_type = VertexType::from_wire(reader.read_varint()?);
            }
            (3, WireType::LengthDelimited) => {
                vertex.mangled_name = Some(reader.read_string("mangled_name")?);
            }
            (4, WireType::LengthDelimited) => {
                vertex.demangled_name = Some(reader.read_string("demangled_name")?);
            }
            // int32 fields are sign-extended to 64 bits on the wire.
            (5, WireType::Varint) => vertex.library_index = Some(reader.read_varint()? as i32),
            (6, WireType::Varint) => vertex.module_index = Some(reader.read_varint()? as i32),
            (_, other) => reader.skip(other)?,
        }
    }
    Ok(vertex)
}
