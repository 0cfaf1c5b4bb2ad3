use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use super::{Symbol, SymbolHost};

/// On-disk shape of a symbol table (JSON or YAML).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolFile {
    #[serde(default)]
    pub symbols: Vec<Symbol>,
}

/// In-memory symbol table keyed by address.
///
/// Serves as the live binary's symbol table for frontends without a
/// disassembler session, and as a test host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: BTreeMap<u64, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a symbol as-is, keeping its `auto` flag.
    pub fn insert(&mut self, symbol: Symbol) {
        self.symbols.insert(symbol.address, symbol);
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in address order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    /// Load a symbol file; the format follows the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read symbol file at {}", path.display()))?;
        let file: SymbolFile = match symbol_format(path)? {
            SymbolFormat::Json => {
                serde_json::from_str(&body).context("Failed to parse symbol file JSON")?
            }
            SymbolFormat::Yaml => {
                serde_yaml::from_str(&body).context("Failed to parse symbol file YAML")?
            }
        };
        Ok(file.into())
    }

    /// Write the table back in the format implied by the file extension.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = SymbolFile { symbols: self.iter().cloned().collect() };
        let body = match symbol_format(path)? {
            SymbolFormat::Json => serde_json::to_string_pretty(&file)?,
            SymbolFormat::Yaml => serde_yaml::to_string(&file)?,
        };
        std::fs::write(path, body)
            .with_context(|| format!("Failed to write symbol file at {}", path.display()))
    }
}

impl From<SymbolFile> for SymbolTable {
    fn from(file: SymbolFile) -> Self {
        let mut table = SymbolTable::new();
        for symbol in file.symbols {
            table.insert(symbol);
        }
        table
    }
}

impl SymbolHost for SymbolTable {
    fn symbol_at(&self, address: u64) -> Option<Symbol> {
        self.symbols.get(&address).cloned()
    }

    fn define_user_symbol(&mut self, symbol: Symbol) {
        self.insert(Symbol { auto: false, ..symbol });
    }
}

enum SymbolFormat {
    Json,
    Yaml,
}

fn symbol_format(path: &Path) -> Result<SymbolFormat> {
    match path.extension().and_then(|e| e.to_str()).unwrap_or_default() {
        "json" => Ok(SymbolFormat::Json),
        "yaml" | "yml" => Ok(SymbolFormat::Yaml),
        other => Err(anyhow!(
            "Unsupported symbol file format '{}' ({}); expected json, yaml or yml",
            other,
            path.display()
        )),
    }
}
