//! Call-graph export decoding.
//!
//! Exports are BinExport2 protobuf messages. Only the parts the viewer needs
//! are decoded (`meta_information` and `call_graph.vertex`); every other field
//! is skipped by wire type, so exports from newer producers still load.

pub mod binexport;
pub mod wire;

use thiserror::Error;

pub use binexport::{BinExport, CallGraph, ExportMeta, Vertex, VertexType};

/// Error type for export decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("truncated message: needed {expected} bytes at offset {offset}, {available} available")]
    Truncated { offset: usize, expected: usize, available: usize },

    #[error("varint overflow at offset {0}")]
    VarintOverflow(usize),

    #[error("unsupported wire type {wire_type} for field {field} at offset {offset}")]
    UnsupportedWireType { field: u64, wire_type: u8, offset: usize },

    #[error("invalid field number 0 at offset {0}")]
    InvalidFieldNumber(usize),

    #[error("field {field} is not valid UTF-8")]
    InvalidUtf8 { field: &'static str },
}
