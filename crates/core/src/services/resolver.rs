//! Cross-binary name resolution.
//!
//! Each side of a match gets a best-known name: the live binary (per
//! [`Role`]) is asked through its [`SymbolHost`], the other side comes from
//! its call-graph export. Names are resolved once at load time; later changes
//! to the live symbol table are only seen after a reload.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::db::FunctionMatch;
use crate::export::CallGraph;
use crate::host::SymbolHost;
use crate::model::{Role, Side};

/// Address to declared (mangled) name, extracted from one call-graph export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportedNameMap {
    names: HashMap<u64, String>,
}

impl ExportedNameMap {
    /// Record every vertex that has both a non-zero address and a non-empty
    /// mangled name. Other vertices are skipped.
    pub fn from_call_graph(graph: &CallGraph) -> Self {
        let mut names = HashMap::new();
        for vertex in &graph.vertices {
            match (vertex.address, vertex.mangled_name.as_deref()) {
                (Some(address), Some(name)) if address != 0 && !name.is_empty() => {
                    names.insert(address, name.to_string());
                }
                _ => {}
            }
        }
        Self { names }
    }

    /// Name map for an export that may lack a call graph.
    pub fn from_optional(graph: Option<&CallGraph>) -> Self {
        graph.map(Self::from_call_graph).unwrap_or_default()
    }

    pub fn get(&self, address: u64) -> Option<&str> {
        self.names.get(&address).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(u64, String)> for ExportedNameMap {
    fn from_iter<I: IntoIterator<Item = (u64, String)>>(iter: I) -> Self {
        Self { names: iter.into_iter().collect() }
    }
}

/// A function match annotated with the resolved name of each side.
///
/// Empty names mean "unknown".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMatch {
    #[serde(flatten)]
    pub record: FunctionMatch,
    pub name1: String,
    pub name2: String,
}

impl ResolvedMatch {
    pub fn name(&self, side: Side) -> &str {
        match side {
            Side::Primary => &self.name1,
            Side::Secondary => &self.name2,
        }
    }

    pub fn address(&self, side: Side) -> Option<u64> {
        self.record.address(side)
    }
}

/// Resolves names for both sides of every match.
pub struct NameResolver<'a, H: SymbolHost + ?Sized> {
    role: Role,
    exports: [&'a ExportedNameMap; 2],
    host: &'a H,
}

impl<'a, H: SymbolHost + ?Sized> NameResolver<'a, H> {
    pub fn new(
        role: Role,
        primary: &'a ExportedNameMap,
        secondary: &'a ExportedNameMap,
        host: &'a H,
    ) -> Self {
        Self { role, exports: [primary, secondary], host }
    }

    /// Best-known name for `address` on `side`, or an empty string.
    ///
    /// The live side only trusts user-assigned symbols; auto-generated names
    /// are not treated as known.
    pub fn resolve(&self, side: Side, address: Option<u64>) -> String {
        let Some(address) = address else {
            return String::new();
        };
        if self.role.is_live(side) {
            return match self.host.symbol_at(address) {
                Some(symbol) if !symbol.auto => symbol.name,
                _ => String::new(),
            };
        }
        self.exports[side.index()].get(address).unwrap_or_default().to_string()
    }

    pub fn resolve_match(&self, record: FunctionMatch) -> ResolvedMatch {
        let name1 = self.resolve(Side::Primary, record.address1);
        let name2 = self.resolve(Side::Secondary, record.address2);
        ResolvedMatch { record, name1, name2 }
    }

    pub fn resolve_all(&self, records: Vec<FunctionMatch>) -> Vec<ResolvedMatch> {
        records.into_iter().map(|record| self.resolve_match(record)).collect()
    }
}
