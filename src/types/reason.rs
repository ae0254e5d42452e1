//! Reason codes for controller decisions and state changes

use serde::{Deserialize, Serialize};

/// Reason codes for all state changes and decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // R101: Idle dwell
    // =========================================================================
    /// Qualifying frame, streak below the confirmation threshold
    R101_DWELL_ACCUMULATING,
    /// Non-qualifying frame broke a running streak
    R101_DWELL_RESET,
    /// Nothing of interest, counter already at zero
    R101_IDLE_QUIET,

    // =========================================================================
    // R201: Intent verification
    // =========================================================================
    /// Oracle confirmed a delivery presentation
    R201_INTENT_CONFIRMED,
    /// Oracle rejected the sighting, backing off
    R201_INTENT_REJECTED,
    /// Oracle call failed, treated as a rejection
    R201_ORACLE_FAILED,

    // =========================================================================
    // R301: Passphrase challenge
    // =========================================================================
    /// Utterance contained the secret phrase
    R301_PHRASE_ACCEPTED,
    /// Utterance heard but the phrase was absent
    R301_PHRASE_REJECTED,
    /// No usable speech captured
    R301_CAPTURE_SILENT,

    // =========================================================================
    // R401: Package receiving
    // =========================================================================
    /// Courier reported the package does not fit
    R401_PACKAGE_TOO_BIG,
    /// Courier confirmed the delivery is complete
    R401_DELIVERY_DONE,
    /// Reply unreadable, closed out like a completed delivery
    R401_STATUS_UNKNOWN,
    /// Courier said nothing, closing up
    R401_COURIER_SILENT,

    // =========================================================================
    // R501: Guarding
    // =========================================================================
    /// Watching, no close approach and no expiry
    R501_GUARD_WATCHING,
    /// Oversized person box, deterrence episode fired
    R501_CLOSE_APPROACH,
    /// Wrong-password penalty window elapsed
    R501_PENALTY_EXPIRED,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R101_DWELL_ACCUMULATING => "R101_DWELL_ACCUMULATING",
            Self::R101_DWELL_RESET => "R101_DWELL_RESET",
            Self::R101_IDLE_QUIET => "R101_IDLE_QUIET",
            Self::R201_INTENT_CONFIRMED => "R201_INTENT_CONFIRMED",
            Self::R201_INTENT_REJECTED => "R201_INTENT_REJECTED",
            Self::R201_ORACLE_FAILED => "R201_ORACLE_FAILED",
            Self::R301_PHRASE_ACCEPTED => "R301_PHRASE_ACCEPTED",
            Self::R301_PHRASE_REJECTED => "R301_PHRASE_REJECTED",
            Self::R301_CAPTURE_SILENT => "R301_CAPTURE_SILENT",
            Self::R401_PACKAGE_TOO_BIG => "R401_PACKAGE_TOO_BIG",
            Self::R401_DELIVERY_DONE => "R401_DELIVERY_DONE",
            Self::R401_STATUS_UNKNOWN => "R401_STATUS_UNKNOWN",
            Self::R401_COURIER_SILENT => "R401_COURIER_SILENT",
            Self::R501_GUARD_WATCHING => "R501_GUARD_WATCHING",
            Self::R501_CLOSE_APPROACH => "R501_CLOSE_APPROACH",
            Self::R501_PENALTY_EXPIRED => "R501_PENALTY_EXPIRED",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R101_DWELL_ACCUMULATING => "Sighting streak building",
            Self::R101_DWELL_RESET => "Sighting streak broken",
            Self::R101_IDLE_QUIET => "Perimeter quiet",
            Self::R201_INTENT_CONFIRMED => "Delivery intent confirmed",
            Self::R201_INTENT_REJECTED => "False alarm, backing off",
            Self::R201_ORACLE_FAILED => "Vision check failed, treated as false alarm",
            Self::R301_PHRASE_ACCEPTED => "Password accepted",
            Self::R301_PHRASE_REJECTED => "Incorrect password",
            Self::R301_CAPTURE_SILENT => "No speech heard",
            Self::R401_PACKAGE_TOO_BIG => "Package too big, guarding it",
            Self::R401_DELIVERY_DONE => "Delivery complete",
            Self::R401_STATUS_UNKNOWN => "Reply unreadable, closing out",
            Self::R401_COURIER_SILENT => "Courier silent, closing up",
            Self::R501_GUARD_WATCHING => "Guarding, perimeter watched",
            Self::R501_CLOSE_APPROACH => "Close approach, deterrent fired",
            Self::R501_PENALTY_EXPIRED => "Penalty window over",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
