//! bindiff-core
//!
//! Core library for inspecting the result of a BinDiff run and porting
//! function names from one compared binary to the other.
//!
//! The crate reads a match database (read-only), decodes the call-graph
//! exports of both binaries, resolves a best-known name for each side of every
//! match, and exposes the result as a sortable table. Porting a name back into
//! the live binary goes through the [`host::SymbolHost`] capability so any
//! frontend (CLI, disassembler plugin, tests) can provide the symbol table.

pub mod db;
pub mod export;
pub mod host;
pub mod model;
pub mod services;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
