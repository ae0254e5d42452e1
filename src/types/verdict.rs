//! Package status verdicts
//!
//! While receiving, the courier's reply is classified into one of three
//! verdicts. Anything unreadable collapses to `Unknown`, which routes the
//! same as `Done`: a misheard "thanks" must close the delivery out, never
//! tip the controller into guarding.

use serde::{Deserialize, Serialize};

/// Outcome of the package status classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageVerdict {
    /// Package too large for the hatch, guard it outside
    TooBig,
    /// Package placed inside, delivery complete
    Done,
    /// Unreadable reply, treated like `Done`
    Unknown,
}

impl PackageVerdict {
    /// Parse an oracle answer. Matching is case-insensitive on the first
    /// recognized keyword; unreadable answers become `Unknown`.
    pub fn parse(answer: &str) -> Self {
        let upper = answer.to_uppercase();
        if upper.contains("TOO_BIG") || upper.contains("TOO BIG") {
            PackageVerdict::TooBig
        } else if upper.contains("DONE") {
            PackageVerdict::Done
        } else {
            PackageVerdict::Unknown
        }
    }

    /// Whether this verdict routes into package guarding
    pub fn requires_guard(&self) -> bool {
        matches!(self, PackageVerdict::TooBig)
    }
}

impl std::fmt::Display for PackageVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PackageVerdict::TooBig => "TOO_BIG",
            PackageVerdict::Done => "DONE",
            PackageVerdict::Unknown => "UNKNOWN",
        };
        write!(f, "{}", name)
    }
}

// =============================================================================
// TESTS
// =============================================================================
