//! An owned diff-viewing session.
//!
//! The session is created by loading a match database together with both
//! call-graph exports, and owns everything for its lifetime: the read-only
//! database handle, the resolved table, and the live binary's symbol host.
//! Dropping it releases all of them. There is no ambient global state.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::db::{
    AlgorithmNames, DbError, DiffLayout, FileRecord, IntegrityError, MatchDb, MatchMetadata,
    ViewerConfig,
};
use crate::export::{BinExport, ExportError, ExportMeta};
use crate::host::SymbolHost;
use crate::model::{Role, Side};
use crate::services::porting::{port_symbol, PortOutcome, PortRefusal};
use crate::services::resolver::{ExportedNameMap, NameResolver};
use crate::services::table::{Column, MatchTable, SortOrder};

/// Failure to load a session. Fatal to the load, never to the host process.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("Failed to read export {}", path.display())]
    ExportRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse export {}", path.display())]
    ExportParse {
        path: PathBuf,
        #[source]
        source: ExportError,
    },

    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}

/// One binary's decoded export, reduced to what the session keeps.
#[derive(Debug, Clone)]
pub struct LoadedExport {
    pub path: PathBuf,
    pub meta: ExportMeta,
    pub vertex_count: usize,
    pub edge_count: usize,
    pub names: ExportedNameMap,
}

impl LoadedExport {
    pub fn load(path: PathBuf) -> Result<Self, LoadError> {
        let data = std::fs::read(&path)
            .map_err(|source| LoadError::ExportRead { path: path.clone(), source })?;
        let export = BinExport::decode(&data)
            .map_err(|source| LoadError::ExportParse { path: path.clone(), source })?;
        let (vertex_count, edge_count) = export
            .call_graph
            .as_ref()
            .map(|g| (g.vertices.len(), g.edge_count))
            .unwrap_or_default();
        let names = ExportedNameMap::from_optional(export.call_graph.as_ref());
        tracing::debug!(
            path = %path.display(),
            vertices = vertex_count,
            named = names.len(),
            "loaded export"
        );
        Ok(Self { path, meta: export.meta, vertex_count, edge_count, names })
    }
}

/// Per-row result of a batch port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortReport {
    pub row: usize,
    #[serde(flatten)]
    pub outcome: PortOutcome,
}

/// A loaded diff, ready to display, sort, navigate and port.
#[derive(Debug)]
pub struct DiffSession<H: SymbolHost> {
    layout: DiffLayout,
    db: MatchDb,
    role: Role,
    metadata: MatchMetadata,
    files: [FileRecord; 2],
    exports: [LoadedExport; 2],
    algorithms: AlgorithmNames,
    table: MatchTable,
    host: H,
}

impl<H: SymbolHost> DiffSession<H> {
    /// Load a match database and both exports, resolve names, and apply the
    /// configured initial sort.
    pub fn open(
        match_db_path: &Path,
        role: Role,
        host: H,
        config: &ViewerConfig,
    ) -> Result<Self, LoadError> {
        let layout = DiffLayout::new(match_db_path, config.export_extension.as_str());
        let db = MatchDb::open_read_only(match_db_path)?;

        let metadata = db.metadata()?;
        let files = [db.file_record(metadata.file1)?, db.file_record(metadata.file2)?];
        let exports = [
            LoadedExport::load(layout.export_path(&files[0].filename))?,
            LoadedExport::load(layout.export_path(&files[1].filename))?,
        ];

        let algorithms = db.algorithm_names()?;
        let matches = db.all_matches()?;
        tracing::debug!(
            matches = matches.len(),
            algorithms = algorithms.len(),
            role = %role,
            "loaded match database"
        );

        let resolved = NameResolver::new(role, &exports[0].names, &exports[1].names, &host)
            .resolve_all(matches);
        let mut table = MatchTable::new(resolved, &algorithms)?;
        table.sort(config.default_sort.column, config.default_sort.order);

        Ok(Self { layout, db, role, metadata, files, exports, algorithms, table, host })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn layout(&self) -> &DiffLayout {
        &self.layout
    }

    pub fn database(&self) -> &MatchDb {
        &self.db
    }

    pub fn metadata(&self) -> &MatchMetadata {
        &self.metadata
    }

    pub fn file(&self, side: Side) -> &FileRecord {
        &self.files[side.index()]
    }

    pub fn export(&self, side: Side) -> &LoadedExport {
        &self.exports[side.index()]
    }

    pub fn algorithms(&self) -> &AlgorithmNames {
        &self.algorithms
    }

    pub fn table(&self) -> &MatchTable {
        &self.table
    }

    pub fn sort(&mut self, column: Column, order: SortOrder) {
        self.table.sort(column, order);
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// End the session and hand the host back (e.g. to persist it).
    pub fn into_host(self) -> H {
        self.host
    }

    /// Address on the live side for `row`, i.e. where navigation should go.
    pub fn live_address(&self, row: usize) -> Option<u64> {
        let side = self.role.live_side()?;
        self.table.row(row)?.matched.address(side)
    }

    /// Port the source-side name of `row` into the live binary.
    ///
    /// With no role set this is a no-op that never touches the host.
    pub fn port(&mut self, row: usize) -> PortOutcome {
        let Some(target) = self.role.live_side() else {
            return PortOutcome::Disabled;
        };
        match self.table.row(row) {
            Some(r) => port_symbol(&r.matched, target, &mut self.host),
            None => PortOutcome::Refused(PortRefusal::NoSuchRow { row }),
        }
    }

    /// Port a selection of rows independently.
    ///
    /// Duplicate indices are ported once, in ascending order. A refusal on one
    /// row never stops the others.
    pub fn port_rows(&mut self, rows: impl IntoIterator<Item = usize>) -> Vec<PortReport> {
        let unique: BTreeSet<usize> = rows.into_iter().collect();
        unique.into_iter().map(|row| PortReport { row, outcome: self.port(row) }).collect()
    }
}
