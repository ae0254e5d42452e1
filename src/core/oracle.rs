//! Oracle adapter: intent and package-status classification
//!
//! Two blocking, fallible calls with asymmetric failure policy, applied
//! by the engine: a failed vision check counts as a rejection (ambiguous
//! vision never opens the hatch), a failed speech classification counts
//! as `Unknown` and closes the delivery out.

use std::collections::VecDeque;

use thiserror::Error;

use crate::core::detect::CameraFrame;
use crate::types::PackageVerdict;

/// Errors an oracle backend can raise
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle backend unavailable: {0}")]
    Unavailable(String),
    #[error("oracle returned an unusable answer: {0}")]
    Unusable(String),
}

/// Classification oracle contract. Both calls may block for seconds.
pub trait IntentOracle: Send {
    /// Is the subject plausibly presenting a delivery to the camera?
    fn verify_delivery_intent(&mut self, frame: &CameraFrame) -> Result<bool, OracleError>;

    /// What did the courier's reply mean for the package?
    fn classify_package_status(&mut self, utterance: &str)
        -> Result<PackageVerdict, OracleError>;
}

/// Oracle that replays prepared answers, one per call. Exhausted intent
/// scripts reject; exhausted status scripts return `Unknown`.
pub struct ScriptedOracle {
    intents: VecDeque<Result<bool, OracleError>>,
    verdicts: VecDeque<Result<PackageVerdict, OracleError>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self {
            intents: VecDeque::new(),
            verdicts: VecDeque::new(),
        }
    }

    pub fn push_intent(mut self, answer: Result<bool, OracleError>) -> Self {
        self.intents.push_back(answer);
        self
    }

    pub fn push_verdict(mut self, answer: Result<PackageVerdict, OracleError>) -> Self {
        self.verdicts.push_back(answer);
        self
    }
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentOracle for ScriptedOracle {
    fn verify_delivery_intent(&mut self, _frame: &CameraFrame) -> Result<bool, OracleError> {
        self.intents.pop_front().unwrap_or(Ok(false))
    }

    fn classify_package_status(
        &mut self,
        _utterance: &str,
    ) -> Result<PackageVerdict, OracleError> {
        self.verdicts.pop_front().unwrap_or(Ok(PackageVerdict::Unknown))
    }
}

/// Oracle with no backend configured: rejects every sighting, reads
/// every reply as `Unknown`.
pub struct NullOracle;

impl IntentOracle for NullOracle {
    fn verify_delivery_intent(&mut self, _frame: &CameraFrame) -> Result<bool, OracleError> {
        Ok(false)
    }

    fn classify_package_status(
        &mut self,
        _utterance: &str,
    ) -> Result<PackageVerdict, OracleError> {
        Ok(PackageVerdict::Unknown)
    }
}

// =============================================================================
// TESTS
// =============================================================================
