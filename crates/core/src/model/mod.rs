//! Role and side selection shared by resolution, porting and navigation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the two binaries compared by a diff run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// `file1` in the match database.
    Primary,
    /// `file2` in the match database.
    Secondary,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Primary => Side::Secondary,
            Side::Secondary => Side::Primary,
        }
    }

    /// Zero-based slot used for per-side arrays.
    pub fn index(self) -> usize {
        match self {
            Side::Primary => 0,
            Side::Secondary => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Primary => "primary",
            Side::Secondary => "secondary",
        }
    }
}

/// Which compared binary (if any) is the analyst's currently open, live binary.
///
/// `None` covers both "explicitly no role" and "not configured yet"; the two
/// are deliberately not distinguished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    None,
    Primary,
    Secondary,
}

impl Role {
    /// The live side, if a definite role is set.
    pub fn live_side(self) -> Option<Side> {
        match self {
            Role::None => None,
            Role::Primary => Some(Side::Primary),
            Role::Secondary => Some(Side::Secondary),
        }
    }

    /// True when `side` is the live binary for this role.
    pub fn is_live(self, side: Side) -> bool {
        self.live_side() == Some(side)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::None => "none",
            Role::Primary => "primary",
            Role::Secondary => "secondary",
        }
    }
}

impl From<Side> for Role {
    fn from(side: Side) -> Self {
        match side {
            Side::Primary => Role::Primary,
            Side::Secondary => Role::Secondary,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Invalid role '{0}'. Allowed: none, primary, secondary")]
pub struct ParseRoleError(String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Role::None),
            "primary" => Ok(Role::Primary),
            "secondary" => Ok(Role::Secondary),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_maps_to_live_side() {
        assert_eq!(Role::None.live_side(), None);
        assert_eq!(Role::Primary.live_side(), Some(Side::Primary));
        assert!(Role::Secondary.is_live(Side::Secondary));
        assert!(!Role::Secondary.is_live(Side::Primary));
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Primary".parse::<Role>().unwrap(), Role::Primary);
        assert_eq!("none".parse::<Role>().unwrap(), Role::None);
        let err = "both".parse::<Role>().unwrap_err();
        assert!(err.to_string().contains("Invalid role"));
    }

    #[test]
    fn sides_are_opposites() {
        assert_eq!(Side::Primary.opposite(), Side::Secondary);
        assert_eq!(Side::Secondary.opposite().index(), 0);
    }
}
