//! Encounter record
//!
//! One `Encounter` covers everything from the first confirmed sighting to
//! the reset back to idle. All per-visit fields live here instead of being
//! scattered across the engine, so resetting is a single assignment and
//! the status API can publish the whole thing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::guard::GuardMode;
use crate::types::state::EncounterState;

/// Per-visit state bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    /// Current position in the state machine
    pub state: EncounterState,
    /// Set exactly while `state` is `Guarding`
    pub guard_mode: Option<GuardMode>,
    /// Consecutive qualifying frames observed while idle
    pub streak: u32,
    /// When the sighting was confirmed and verification began
    pub started_at: Option<DateTime<Utc>>,
    /// Deterrence episodes fired during this encounter
    pub deterrence_count: u32,
}

impl Encounter {
    /// Fresh idle encounter
    pub fn new() -> Self {
        Self {
            state: EncounterState::Idle,
            guard_mode: None,
            streak: 0,
            started_at: None,
            deterrence_count: 0,
        }
    }

    /// Confirmed sighting: move to verification and stamp the start time
    pub fn begin(&mut self, now: DateTime<Utc>) {
        self.state = EncounterState::Verifying;
        self.guard_mode = None;
        self.streak = 0;
        self.started_at = Some(now);
        self.deterrence_count = 0;
    }

    pub fn enter_receiving(&mut self) {
        self.state = EncounterState::Receiving;
        self.guard_mode = None;
    }

    pub fn enter_guarding(&mut self, mode: GuardMode) {
        self.state = EncounterState::Guarding;
        self.guard_mode = Some(mode);
    }

    /// Back to idle, dropping all per-visit fields
    pub fn reset(&mut self) {
        *self = Encounter::new();
    }

    /// Guard mode is carried exactly while guarding
    pub fn is_consistent(&self) -> bool {
        (self.state == EncounterState::Guarding) == self.guard_mode.is_some()
    }
}

impl Default for Encounter {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================
