//! Output structures for terminal display

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Action, EncounterState, GuardMode, ReasonCode};

/// Output structure for each processed tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickOutput {
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// State before the tick
    pub state_before: EncounterState,
    /// State after the tick
    pub state: EncounterState,
    /// Guard mode after the tick, if guarding
    pub guard_mode: Option<GuardMode>,
    /// Seconds left on the wrong-password penalty window, while it runs
    pub guard_countdown: Option<u64>,
    /// Consecutive qualifying frames after the tick
    pub streak: u32,
    /// Short label summary of what the detector saw
    pub seen: String,
    /// Reason for the outcome
    pub reason: ReasonCode,
    /// Side effects performed during the tick, in order
    pub actions: Vec<Action>,
}

impl TickOutput {
    /// Create new output
    pub fn new(
        state_before: EncounterState,
        state: EncounterState,
        guard_mode: Option<GuardMode>,
        streak: u32,
        seen: String,
        reason: ReasonCode,
        actions: Vec<Action>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            state_before,
            state,
            guard_mode,
            guard_countdown: None,
            streak,
            seen,
            reason,
            actions,
        }
    }

    /// Whether this tick changed state
    pub fn transitioned(&self) -> bool {
        self.state_before != self.state
    }

    /// Ledger receipt digest from this tick's incident, if one was appended
    pub fn receipt_digest(&self) -> Option<&str> {
        self.actions.iter().find_map(|action| match action {
            Action::IncidentLogged {
                receipt: Some(digest),
            } => Some(digest.as_str()),
            _ => None,
        })
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.state.color_code();
        let reset = EncounterState::color_reset();
        let emoji = self.state.emoji();

        let mode = match self.guard_mode {
            Some(mode) => format!(" [{}]", mode),
            None => String::new(),
        };
        let guard = match self.guard_countdown {
            Some(secs) => format!(" | guard={}s", secs),
            None => String::new(),
        };
        let receipt = match self.receipt_digest() {
            Some(digest) => format!(" | receipt={}", digest),
            None => String::new(),
        };

        format!(
            "{}{} state={}{} | seen={} | streak={} | {}{}{}{}",
            color, emoji, self.state, mode, self.seen, self.streak,
            self.reason.code(), guard, receipt, reset
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        let mode = match self.guard_mode {
            Some(mode) => format!(" | mode={}", mode),
            None => String::new(),
        };
        let guard = match self.guard_countdown {
            Some(secs) => format!(" | guard={}s", secs),
            None => String::new(),
        };
        let actions = if self.actions.is_empty() {
            "-".to_string()
        } else {
            self.actions
                .iter()
                .map(Action::tag)
                .collect::<Vec<_>>()
                .join("+")
        };
        let receipt = match self.receipt_digest() {
            Some(digest) => format!(" | receipt={}", digest),
            None => String::new(),
        };

        format!(
            "state={}{} | seen={} | streak={} | reason={}{} | actions={}{}",
            self.state,
            mode,
            self.seen,
            self.streak,
            self.reason.code(),
            guard,
            actions,
            receipt
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tone;

    fn sample() -> TickOutput {
        TickOutput::new(
            EncounterState::Verifying,
            EncounterState::Guarding,
            Some(GuardMode::WrongPassword),
            0,
            "person".to_string(),
            ReasonCode::R301_PHRASE_REJECTED,
            vec![Action::Spoke {
                tone: Tone::Aggressive,
                text: "Incorrect password. I am entering guard mode. Step away.".to_string(),
            }],
        )
    }

    #[test]
    fn test_transitioned_detects_state_change() {
        assert!(sample().transitioned());

        let steady = TickOutput::new(
            EncounterState::Idle,
            EncounterState::Idle,
            None,
            2,
            "person+package".to_string(),
            ReasonCode::R101_DWELL_ACCUMULATING,
            vec![],
        );
        assert!(!steady.transitioned());
    }

    #[test]
    fn test_parseable_string_carries_mode_reason_and_tags() {
        let line = sample().to_parseable_string();
        assert!(line.contains("state=GUARDING"));
        assert!(line.contains("mode=WRONG_PASSWORD"));
        assert!(line.contains("reason=R301_PHRASE_REJECTED"));
        assert!(line.contains("actions=SPOKE"));

        let mut quiet = sample();
        quiet.actions.clear();
        assert!(quiet.to_parseable_string().contains("actions=-"));
    }

    #[test]
    fn test_countdown_renders_while_the_window_runs() {
        let mut out = sample();
        out.guard_countdown = Some(7);
        assert!(out.to_terminal_string().contains("guard=7s"));
        assert!(out.to_parseable_string().contains("guard=7s"));

        // Absent outside a running window
        assert!(!sample().to_terminal_string().contains("guard="));
        assert!(!sample().to_parseable_string().contains("guard="));
    }

    #[test]
    fn test_incident_receipt_renders_in_both_formats() {
        let digest = "4f2c".repeat(16);
        let mut out = sample();
        out.actions.push(Action::IncidentLogged {
            receipt: Some(digest.clone()),
        });

        assert_eq!(out.receipt_digest(), Some(digest.as_str()));
        assert!(out.to_terminal_string().contains(&digest));
        assert!(out.to_parseable_string().contains(&digest));
        assert!(out.to_parseable_string().contains("actions=SPOKE+INCIDENT"));

        let mut unreceipted = sample();
        unreceipted
            .actions
            .push(Action::IncidentLogged { receipt: None });
        assert!(!unreceipted.to_terminal_string().contains("receipt="));
        assert!(!unreceipted.to_parseable_string().contains("receipt="));
    }

    #[test]
    fn test_terminal_string_is_colored() {
        let line = sample().to_terminal_string();
        assert!(line.starts_with(EncounterState::Guarding.color_code()));
        assert!(line.ends_with(EncounterState::color_reset()));
    }
}
