//! Encounter state definitions

use serde::{Deserialize, Serialize};

/// The four possible states of the watch controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EncounterState {
    /// Scanning the feed for a person presenting a package
    Idle,
    /// Confirmed detection, waiting for the spoken passphrase
    Verifying,
    /// Hatch open, waiting for the courier's package status
    Receiving,
    /// Deterring an intruder or watching over a left package
    Guarding,
}

impl EncounterState {
    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            EncounterState::Idle => "\x1b[90m",      // Gray
            EncounterState::Verifying => "\x1b[33m", // Orange/Yellow
            EncounterState::Receiving => "\x1b[32m", // Green
            EncounterState::Guarding => "\x1b[31m",  // Red
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    /// Get emoji for state
    pub fn emoji(&self) -> &'static str {
        match self {
            EncounterState::Idle => "👁",
            EncounterState::Verifying => "🔑",
            EncounterState::Receiving => "📦",
            EncounterState::Guarding => "🛡",
        }
    }
}

impl std::fmt::Display for EncounterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EncounterState::Idle => "IDLE",
            EncounterState::Verifying => "VERIFYING",
            EncounterState::Receiving => "RECEIVING",
            EncounterState::Guarding => "GUARDING",
        };
        write!(f, "{}", name)
    }
}
