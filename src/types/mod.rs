//! Core types for Warden-0

mod action;
mod detection;
mod encounter;
mod guard;
mod incident;
mod output;
mod reason;
mod state;
mod verdict;

pub use action::{Action, Tone};
pub use detection::{BoundingBox, Detection, DetectionFrame, Label};
pub use encounter::Encounter;
pub use guard::GuardMode;
pub use incident::{IncidentRecord, LedgerReceipt};
pub use output::TickOutput;
pub use reason::ReasonCode;
pub use state::EncounterState;
pub use verdict::PackageVerdict;
