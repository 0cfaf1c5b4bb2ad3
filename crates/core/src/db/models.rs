use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::Side;

/// The singleton `metadata` row of a match database.
///
/// Only `file1`/`file2` are required; the global parameters of the diff run
/// are carried when the database provides them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchMetadata {
    /// `file.id` of the primary binary.
    pub file1: i64,
    /// `file.id` of the secondary binary.
    pub file2: i64,
    pub version: Option<String>,
    pub description: Option<String>,
    pub created: Option<String>,
    /// Overall similarity of the two binaries.
    pub similarity: Option<f64>,
    /// Overall confidence of the diff run.
    pub confidence: Option<f64>,
}

impl MatchMetadata {
    /// `file.id` referenced for the given side.
    pub fn file_id(&self, side: Side) -> i64 {
        match side {
            Side::Primary => self.file1,
            Side::Secondary => self.file2,
        }
    }
}

/// One compared binary as recorded in the `file` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: i64,
    /// Base name used to locate the call-graph export next to the database.
    pub filename: String,
    /// Name of the original executable, when recorded.
    pub exe_filename: Option<String>,
    /// Content hash of the executable (hex), when recorded.
    pub hash: Option<String>,
}

/// One matched function pair from the `function` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionMatch {
    /// SQLite rowid; stable identity for diagnostics.
    pub id: i64,
    pub address1: Option<u64>,
    pub address2: Option<u64>,
    /// Always within `0.0..=1.0`; enforced at load.
    pub similarity: f64,
    /// Always within `0.0..=1.0`; enforced at load.
    pub confidence: f64,
    /// Foreign key into `functionalgorithm`.
    pub algorithm: i64,
}

impl FunctionMatch {
    pub fn address(&self, side: Side) -> Option<u64> {
        match side {
            Side::Primary => self.address1,
            Side::Secondary => self.address2,
        }
    }
}

/// `functionalgorithm` lookup: algorithm id to human-readable label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmNames {
    names: HashMap<i64, String>,
}

impl AlgorithmNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: i64, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }

    pub fn get(&self, id: i64) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(i64, String)> for AlgorithmNames {
    fn from_iter<I: IntoIterator<Item = (i64, String)>>(iter: I) -> Self {
        Self { names: iter.into_iter().collect() }
    }
}
