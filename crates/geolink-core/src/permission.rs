//! User's standing decision for a permission-gated action.

use std::fmt;
use std::str::FromStr;

/// Standing answer to "may the converter hit the network for this?".
///
/// `Ask` is the default everywhere a preference has never been stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Always,
    Ask,
    Never,
}

impl Default for Permission {
    fn default() -> Self {
        Permission::Ask
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Always => write!(f, "always"),
            Permission::Ask => write!(f, "ask"),
            Permission::Never => write!(f, "never"),
        }
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "always" => Ok(Permission::Always),
            "ask" => Ok(Permission::Ask),
            "never" => Ok(Permission::Never),
            other => Err(format!("unknown permission value: {other}")),
        }
    }
}
