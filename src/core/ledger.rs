//! Incident ledger: append-only record of deterrence episodes
//!
//! Best-effort by contract: a receipt proves the append landed, but the
//! controller treats a missing receipt as normal. Running without any
//! ledger at all is a supported mode.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::types::{IncidentRecord, LedgerReceipt};

/// Errors a ledger backend can raise
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger write failed")]
    Io(#[from] std::io::Error),
    #[error("record encoding failed")]
    Encode(#[from] serde_json::Error),
}

/// Append-only incident log contract. `Ok(None)` means the backend has
/// nowhere to write, which is not a failure.
pub trait IncidentLedger: Send {
    fn append(&mut self, record: &IncidentRecord)
        -> Result<Option<LedgerReceipt>, LedgerError>;
}

/// Ledger that appends one JSON record per line to a file
pub struct JsonlLedger {
    file: File,
    sequence: u64,
}

impl JsonlLedger {
    /// Open or create the ledger file. The sequence continues from the
    /// number of lines already present.
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let existing = std::fs::read_to_string(path)
            .map(|s| s.lines().count() as u64)
            .unwrap_or(0);
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file,
            sequence: existing,
        })
    }
}

impl IncidentLedger for JsonlLedger {
    fn append(
        &mut self,
        record: &IncidentRecord,
    ) -> Result<Option<LedgerReceipt>, LedgerError> {
        let line = record.canonical_json()?;
        let digest = record.digest()?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.file.flush()?;
        self.sequence += 1;
        Ok(Some(LedgerReceipt::new(digest, self.sequence)))
    }
}

/// Ledger with no backend configured
pub struct NullLedger;

impl IncidentLedger for NullLedger {
    fn append(
        &mut self,
        _record: &IncidentRecord,
    ) -> Result<Option<LedgerReceipt>, LedgerError> {
        Ok(None)
    }
}

/// In-memory ledger with shared inspection, for tests and dry runs
#[derive(Clone, Default)]
pub struct MemoryLedger {
    records: Arc<Mutex<Vec<IncidentRecord>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far
    pub fn records(&self) -> Vec<IncidentRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl IncidentLedger for MemoryLedger {
    fn append(
        &mut self,
        record: &IncidentRecord,
    ) -> Result<Option<LedgerReceipt>, LedgerError> {
        let digest = record.digest()?;
        let mut records = self
            .records
            .lock()
            .map_err(|_| LedgerError::Io(std::io::Error::other("ledger mutex poisoned")))?;
        records.push(record.clone());
        Ok(Some(LedgerReceipt::new(digest, records.len() as u64)))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GuardMode;
    use chrono::Utc;

    fn record(episode: u32) -> IncidentRecord {
        IncidentRecord::new(
            Utc::now(),
            GuardMode::WrongPassword,
            "close_approach",
            "Intruder detected. You are being recorded.",
            episode,
        )
    }

    #[test]
    fn test_memory_ledger_sequences_appends() {
        let mut ledger = MemoryLedger::new();
        let inspector = ledger.clone();

        let first = ledger.append(&record(1)).unwrap().unwrap();
        let second = ledger.append(&record(2)).unwrap().unwrap();

        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert_eq!(inspector.records().len(), 2);
    }

    #[test]
    fn test_null_ledger_returns_no_receipt() {
        let mut ledger = NullLedger;
        assert!(ledger.append(&record(1)).unwrap().is_none());
    }

    #[test]
    fn test_jsonl_ledger_appends_one_line_per_record() {
        let path = std::env::temp_dir().join(format!(
            "warden0-ledger-test-{}-{:?}.jsonl",
            std::process::id(),
            std::thread::current().id()
        ));
        let _ = std::fs::remove_file(&path);

        {
            let mut ledger = JsonlLedger::open(&path).unwrap();
            let receipt = ledger.append(&record(1)).unwrap().unwrap();
            assert_eq!(receipt.sequence, 1);
            ledger.append(&record(2)).unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        let parsed: IncidentRecord = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
        assert_eq!(parsed.episode, 1);

        // Reopening continues the sequence
        let mut ledger = JsonlLedger::open(&path).unwrap();
        let receipt = ledger.append(&record(3)).unwrap().unwrap();
        assert_eq!(receipt.sequence, 3);

        let _ = std::fs::remove_file(&path);
    }
}
