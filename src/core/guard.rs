//! Guard timer: the wrong-password penalty window
//!
//! Started when guarding begins over a wrong password and restarted after
//! every deterrence episode, so the window cannot expire while a warning
//! sequence is still playing out. Package guarding never consults it.

use std::time::{Duration, Instant};

use crate::WRONG_PASSWORD_TIMEOUT_SECS;

/// Elapsed-time guard for the wrong-password penalty
#[derive(Debug, Clone)]
pub struct GuardTimer {
    started: Option<Instant>,
    threshold: Duration,
}

impl Default for GuardTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl GuardTimer {
    /// Create new timer with the default penalty window (10s), not running
    pub fn new() -> Self {
        Self {
            started: None,
            threshold: Duration::from_secs(WRONG_PASSWORD_TIMEOUT_SECS),
        }
    }

    /// Create timer with a custom window
    pub fn with_threshold(threshold: Duration) -> Self {
        Self {
            started: None,
            threshold,
        }
    }

    /// Record the current time as the window start
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Stop tracking, as when guarding ends
    pub fn clear(&mut self) {
        self.started = None;
    }

    /// Whether the window has elapsed. A timer that was never started
    /// cannot expire.
    pub fn expired(&self) -> bool {
        match self.started {
            Some(started) => started.elapsed() >= self.threshold,
            None => false,
        }
    }

    /// Time left before expiry, `None` when the timer is not running
    pub fn remaining(&self) -> Option<Duration> {
        self.started
            .map(|started| self.threshold.saturating_sub(started.elapsed()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
