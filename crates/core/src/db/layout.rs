use std::path::{Path, PathBuf};

/// Logical layout of a diff directory on disk.
///
/// A BinDiff result lives next to the call-graph exports of both binaries:
/// `<dir>/<file.filename>.<export_extension>`. This type does *not* perform
/// any IO itself.
#[derive(Debug, Clone)]
pub struct DiffLayout {
    /// Path to the match database (`*.BinDiff`).
    pub match_db_path: PathBuf,
    /// Directory holding the match database and the exports.
    pub dir: PathBuf,
    /// Extension of export files, without the leading dot.
    pub export_extension: String,
}

impl DiffLayout {
    /// Compute the layout for a match database at `match_db_path`.
    pub fn new(match_db_path: impl AsRef<Path>, export_extension: impl Into<String>) -> Self {
        let match_db_path = match_db_path.as_ref().to_path_buf();
        let dir = match_db_path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self { match_db_path, dir, export_extension: export_extension.into() }
    }

    /// Path of the call-graph export for a `file.filename` value.
    pub fn export_path(&self, filename: &str) -> PathBuf {
        self.dir.join(format!("{filename}.{}", self.export_extension))
    }
}
