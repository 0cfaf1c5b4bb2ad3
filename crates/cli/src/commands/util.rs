use std::path::Path;

use anyhow::{Context, Result};
use bindiff_core::db::{load_viewer_config_or_default, ViewerConfig};
use bindiff_core::host::SymbolTable;
use bindiff_core::model::Role;
use bindiff_core::services::{Column, DiffSession, SortOrder};

/// Everything needed to open a viewing session from the command line.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Path to the match database (`*.BinDiff`).
    pub db: String,
    pub role: Role,
    /// Symbol file standing in for the live binary's symbol table.
    pub symbols: Option<String>,
    /// Optional viewer config (JSON/YAML).
    pub config: Option<String>,
    /// Column override for the initial sort.
    pub sort: Option<Column>,
    pub descending: bool,
}

impl SessionOptions {
    pub fn new(db: impl Into<String>, role: Role) -> Self {
        Self { db: db.into(), role, ..Self::default() }
    }
}

/// Load the symbol file if given, otherwise start from an empty table.
///
/// A path that does not exist yet also yields an empty table; `port` creates
/// the file when it saves.
pub fn load_symbols(path: Option<&str>) -> Result<SymbolTable> {
    match path {
        Some(p) if !Path::new(p).exists() => {
            tracing::debug!(path = p, "symbol file does not exist yet, starting empty");
            Ok(SymbolTable::new())
        }
        Some(p) => SymbolTable::load(Path::new(p)),
        None => Ok(SymbolTable::new()),
    }
}

/// Load config, symbols and the session, then apply any sort override.
///
/// Row indices printed by `show` and accepted by `port`/`locate` refer to the
/// order produced here.
pub fn open_session(opts: &SessionOptions) -> Result<(ViewerConfig, DiffSession<SymbolTable>)> {
    let config = load_viewer_config_or_default(opts.config.as_deref().map(Path::new))?;
    let symbols = load_symbols(opts.symbols.as_deref())?;
    let mut session = DiffSession::open(Path::new(&opts.db), opts.role, symbols, &config)
        .with_context(|| format!("Failed to load matches from {}", opts.db))?;

    if opts.sort.is_some() || opts.descending {
        let column = opts.sort.unwrap_or(config.default_sort.column);
        let order = if opts.descending { SortOrder::Descending } else { SortOrder::Ascending };
        session.sort(column, order);
    }
    tracing::debug!(
        db = %session.layout().match_db_path.display(),
        exports = %session.layout().dir.display(),
        rows = session.table().len(),
        algorithms = session.algorithms().len(),
        role = %session.role(),
        "opened diff session"
    );
    Ok((config, session))
}
