//! Guard mode: why the controller is currently guarding

use serde::{Deserialize, Serialize};

/// The reason motivating the GUARDING state, governing whether a timeout
/// applies.
///
/// `PackageGuard` has no programmed exit: the controller watches the left
/// package until an operator resets the process. `has_timeout` carries
/// that asymmetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardMode {
    /// Temporary penalty after a wrong passphrase; self-clears
    WrongPassword,
    /// Watching a package left outside; cleared only by external reset
    PackageGuard,
}

impl GuardMode {
    /// Whether this mode is governed by the guard timer
    pub fn has_timeout(&self) -> bool {
        matches!(self, GuardMode::WrongPassword)
    }
}

impl std::fmt::Display for GuardMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GuardMode::WrongPassword => "WRONG_PASSWORD",
            GuardMode::PackageGuard => "PACKAGE_GUARD",
        };
        write!(f, "{}", name)
    }
}
