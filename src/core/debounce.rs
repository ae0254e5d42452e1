//! Debounce counter: consecutive-frame confirmation
//!
//! A single frame from the detector is never trusted. A sighting is
//! confirmed only after enough consecutive qualifying frames, and one
//! non-qualifying frame drops the streak straight back to zero.

use crate::DEBOUNCE_CONFIRM_FRAMES;

/// Consecutive qualifying-frame counter
#[derive(Debug, Clone, Default)]
pub struct DebounceCounter {
    count: u32,
}

impl DebounceCounter {
    /// Create new counter at zero
    pub fn new() -> Self {
        Self { count: 0 }
    }

    /// Feed one frame's qualification, return the running count
    pub fn observe(&mut self, qualifies: bool) -> u32 {
        if qualifies {
            self.count += 1;
        } else {
            self.count = 0;
        }
        self.count
    }

    /// Current streak length
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Whether the streak has reached the confirmation threshold
    pub fn confirmed(&self) -> bool {
        self.count >= DEBOUNCE_CONFIRM_FRAMES
    }

    /// Drop the streak to zero
    pub fn reset(&mut self) {
        self.count = 0;
    }
}

// =============================================================================
// TESTS
// =============================================================================
