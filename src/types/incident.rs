//! Incident records and ledger receipts
//!
//! Every deterrence episode is written to an append-only ledger. The
//! record carries enough to reconstruct the episode, and its digest ties
//! the receipt back to the exact bytes that were appended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::guard::GuardMode;

/// One deterrence episode, as appended to the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// When the deterrent fired
    pub recorded_at: DateTime<Utc>,
    /// Guard mode active at the time
    pub guard_mode: GuardMode,
    /// What tripped the episode
    pub trigger: String,
    /// The warning line spoken at the intruder
    pub warning: String,
    /// Episode number within the encounter, starting at 1
    pub episode: u32,
}

impl IncidentRecord {
    pub fn new(
        recorded_at: DateTime<Utc>,
        guard_mode: GuardMode,
        trigger: impl Into<String>,
        warning: impl Into<String>,
        episode: u32,
    ) -> Self {
        Self {
            recorded_at,
            guard_mode,
            trigger: trigger.into(),
            warning: warning.into(),
            episode,
        }
    }

    /// Canonical serialized form, also the bytes the ledger appends
    pub fn canonical_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// SHA-256 over the canonical form, hex encoded
    pub fn digest(&self) -> serde_json::Result<String> {
        let payload = self.canonical_json()?;
        let mut hasher = Sha256::new();
        hasher.update(payload.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// Proof of append returned by a ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    /// Digest of the appended record
    pub digest: String,
    /// Position in the ledger, 1-based
    pub sequence: u64,
}

impl LedgerReceipt {
    pub fn new(digest: impl Into<String>, sequence: u64) -> Self {
        Self {
            digest: digest.into(),
            sequence,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
