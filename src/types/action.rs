//! Effect records
//!
//! Every side effect the engine performs during a tick is recorded as an
//! `Action` on the tick output. Tests assert against these records instead
//! of instrumenting the adapters.

use serde::{Deserialize, Serialize};

/// Delivery register for spoken lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Friendly,
    Aggressive,
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Tone::Friendly => "friendly",
            Tone::Aggressive => "aggressive",
        };
        write!(f, "{}", name)
    }
}

/// One side effect performed by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// A line was sent to the speech synthesizer
    Spoke { tone: Tone, text: String },
    /// The deterrent command was written to the actuator link
    DeterrentFired,
    /// An incident record was appended to the ledger
    IncidentLogged { receipt: Option<String> },
    /// The engine held the loop for a fixed pause
    Held { seconds: u64 },
}

impl Action {
    /// Short tag for log lines
    pub fn tag(&self) -> &'static str {
        match self {
            Action::Spoke { .. } => "SPOKE",
            Action::DeterrentFired => "DETERRENT",
            Action::IncidentLogged { .. } => "INCIDENT",
            Action::Held { .. } => "HELD",
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
