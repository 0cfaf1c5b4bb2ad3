//! Match database integration and diff directory layout.
//!
//! This module wraps a read-only SQLite match database produced by a prior
//! diff run:
//! - `metadata`: the singleton row naming the two compared files.
//! - `file`: one row per compared binary.
//! - `function`: one row per matched function pair.
//! - `functionalgorithm`: algorithm id to name lookup.
//!
//! It also defines `DiffLayout` (where the exports live relative to the match
//! database) and `ViewerConfig` (serializable viewer settings).

pub mod config;
pub mod layout;
pub mod match_db;
pub mod models;

pub use config::*;
pub use layout::*;
pub use match_db::*;
pub use models::*;
