//! Conflict-safe symbol porting.
//!
//! A name is copied from the source side of a match into the live binary only
//! when the target location has no symbol or only an auto-generated one. A
//! name that a user (or any deliberate process) assigned is never replaced.

use std::fmt;

use serde::Serialize;

use crate::host::{Symbol, SymbolHost};
use crate::model::Side;
use crate::services::resolver::ResolvedMatch;

/// Placeholder used in reports when the target has no symbol.
pub const UNNAMED: &str = "<unnamed>";

/// Why a row was not ported. These are expected outcomes, not failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PortRefusal {
    /// The selection referenced a row that does not exist.
    NoSuchRow { row: usize },
    /// The match has no address on the target side.
    NoTargetAddress,
    /// The source side has no resolved name.
    NoSourceName { address: u64, current: Option<String> },
    /// The target already carries a user-assigned name.
    AlreadyNamed { address: u64, name: String },
}

impl fmt::Display for PortRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortRefusal::NoSuchRow { row } => write!(f, "row {row} does not exist"),
            PortRefusal::NoTargetAddress => write!(f, "match has no target address"),
            PortRefusal::NoSourceName { address, current } => write!(
                f,
                "{} @ {address:x} has no source name",
                current.as_deref().unwrap_or(UNNAMED)
            ),
            PortRefusal::AlreadyNamed { address, name } => {
                write!(f, "{name} @ {address:x} is already named")
            }
        }
    }
}

/// Result of porting one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PortOutcome {
    /// No live role is set; nothing was read or written.
    Disabled,
    Ported { address: u64, previous: Option<String>, name: String },
    Refused(PortRefusal),
}

impl PortOutcome {
    pub fn is_ported(&self) -> bool {
        matches!(self, PortOutcome::Ported { .. })
    }
}

impl fmt::Display for PortOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortOutcome::Disabled => write!(f, "porting disabled (no role)"),
            PortOutcome::Ported { address, previous, name } => write!(
                f,
                "{} @ {address:x} -> {name}",
                previous.as_deref().unwrap_or(UNNAMED)
            ),
            PortOutcome::Refused(refusal) => write!(f, "skipped: {refusal}"),
        }
    }
}

/// Port the source-side name of `matched` onto `target` in the live binary.
///
/// Exactly one write happens on success and none otherwise.
pub fn port_symbol<H: SymbolHost + ?Sized>(
    matched: &ResolvedMatch,
    target: Side,
    host: &mut H,
) -> PortOutcome {
    let source_name = matched.name(target.opposite());
    let Some(address) = matched.address(target) else {
        tracing::warn!(
            "Port symbols: match {} has no {} address, skipping",
            matched.record.id,
            target.as_str()
        );
        return PortOutcome::Refused(PortRefusal::NoTargetAddress);
    };

    let existing = host.symbol_at(address);
    let current = existing.as_ref().map(|s| s.name.clone());
    let current_text = current.as_deref().unwrap_or(UNNAMED);

    if source_name.is_empty() {
        tracing::warn!("Port symbols: {current_text} @ {address:x} has no source name, skipping");
        return PortOutcome::Refused(PortRefusal::NoSourceName { address, current });
    }

    if let Some(symbol) = existing.as_ref().filter(|s| !s.auto) {
        tracing::warn!("Port symbols: {current_text} @ {address:x} is already named, skipping");
        return PortOutcome::Refused(PortRefusal::AlreadyNamed {
            address,
            name: symbol.name.clone(),
        });
    }

    tracing::info!("Port symbols: {current_text} @ {address:x} -> {source_name}");
    host.define_user_symbol(Symbol::user(address, source_name));
    PortOutcome::Ported { address, previous: current, name: source_name.to_string() }
}
