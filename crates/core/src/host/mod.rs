//! Host symbol capability.
//!
//! The live binary's symbol table belongs to the host environment (a
//! disassembler session, a symbol file, a test double). The core only needs
//! two operations from it, expressed as the [`SymbolHost`] trait and
//! implemented by one adapter per host.

pub mod symbols;

use serde::{Deserialize, Serialize};

pub use symbols::{SymbolFile, SymbolTable};

/// A named location in the live binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub address: u64,
    pub name: String,
    /// Assigned automatically by analysis rather than by a user.
    #[serde(default)]
    pub auto: bool,
}

impl Symbol {
    /// A user-assigned function symbol.
    pub fn user(address: u64, name: impl Into<String>) -> Self {
        Self { address, name: name.into(), auto: false }
    }

    /// An analysis-generated (default) symbol.
    pub fn auto(address: u64, name: impl Into<String>) -> Self {
        Self { address, name: name.into(), auto: true }
    }
}

/// Symbol table access provided by the host environment.
///
/// The host serializes concurrent mutation; implementations need no locking
/// on behalf of the core.
pub trait SymbolHost {
    /// The symbol defined at exactly `address`, if any.
    fn symbol_at(&self, address: u64) -> Option<Symbol>;

    /// Create or overwrite a user-level function symbol.
    fn define_user_symbol(&mut self, symbol: Symbol);
}

impl<H: SymbolHost + ?Sized> SymbolHost for &mut H {
    fn symbol_at(&self, address: u64) -> Option<Symbol> {
        (**self).symbol_at(address)
    }

    fn define_user_symbol(&mut self, symbol: Symbol) {
        (**self).define_user_symbol(symbol)
    }
}
