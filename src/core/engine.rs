//! Warden engine: the decision core
//!
//! State transitions:
//! - IDLE → VERIFYING: 5 consecutive qualifying frames + intent confirmed
//! - VERIFYING → RECEIVING: utterance contains the secret phrase
//! - VERIFYING → GUARDING: utterance heard but phrase absent (10s penalty)
//! - RECEIVING → GUARDING: package too big (no timeout)
//! - RECEIVING → IDLE: delivery done, reply unreadable, or silence
//! - GUARDING → IDLE: wrong-password penalty window expires
//!
//! Each tick splits into three steps: gather observations (detector,
//! oracle, microphone as the state demands), a pure decision over those
//! observations, and effect execution in directive order. The decision
//! step never touches an adapter, so the whole state machine is testable
//! with fabricated observations.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::core::actuate::{ActuatorLink, Pacer, Voice};
use crate::core::capture::SpeechCapture;
use crate::core::debounce::DebounceCounter;
use crate::core::detect::{CameraFrame, DetectorHandle};
use crate::core::guard::GuardTimer;
use crate::core::ledger::IncidentLedger;
use crate::core::oracle::IntentOracle;
use crate::core::phrase::PhraseMatcher;
use crate::types::{
    Action, Encounter, EncounterState, GuardMode, IncidentRecord, PackageVerdict, ReasonCode,
    TickOutput, Tone,
};
use crate::{
    ATTACK_COMMAND, CONFIDENCE_GUARD, CONFIDENCE_SCAN, DELIVERY_FAREWELL_HOLD_SECS,
    DETERRENCE_COOLDOWN_SECS, FALSE_ALARM_BACKOFF_SECS, HATCH_CLOSE_HOLD_SECS,
    LINE_DELIVERY_THANKS, LINE_HATCH_CLOSING, LINE_PACKAGE_TOO_BIG, LINE_PASSWORD_ACCEPTED,
    LINE_PASSWORD_PROMPT, LINE_PASSWORD_REJECTED, OVERSIZE_HEIGHT_RATIO, WARNING_LINES,
};

/// Everything outside the decision core, bundled for one tick
pub struct Periphery {
    pub detector: DetectorHandle,
    pub oracle: Box<dyn IntentOracle>,
    pub mic: Box<dyn SpeechCapture>,
    pub voice: Box<dyn Voice>,
    pub link: Box<dyn ActuatorLink>,
    pub ledger: Box<dyn IncidentLedger>,
    pub pacer: Box<dyn Pacer>,
    pub rng: StdRng,
}

impl Periphery {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        detector: DetectorHandle,
        oracle: Box<dyn IntentOracle>,
        mic: Box<dyn SpeechCapture>,
        voice: Box<dyn Voice>,
        link: Box<dyn ActuatorLink>,
        ledger: Box<dyn IncidentLedger>,
        pacer: Box<dyn Pacer>,
    ) -> Self {
        Self {
            detector,
            oracle,
            mic,
            voice,
            link,
            ledger,
            pacer,
            rng: StdRng::from_entropy(),
        }
    }

    /// Fix the warning-selection sequence, for reproducible runs
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

/// Outcome of the intent check on a threshold-crossing tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntentObservation {
    /// Streak below threshold, oracle not asked
    #[default]
    NotConsulted,
    Confirmed,
    Rejected,
    /// Oracle call failed; routed like a rejection
    Failed,
}

/// Everything the decision step needs from the outside world for one tick
#[derive(Debug, Clone)]
pub struct Observations {
    pub now: DateTime<Utc>,
    /// Frame had a person together with a box or package
    pub qualifies: bool,
    /// Debounce streak after this frame was fed in
    pub streak: u32,
    pub intent: IntentObservation,
    /// Captured utterance; empty string means silence
    pub utterance: Option<String>,
    /// Whether the utterance contained the secret phrase
    pub phrase_match: bool,
    pub verdict: Option<PackageVerdict>,
    /// Wrong-password penalty window has elapsed
    pub guard_expired: bool,
    /// An oversized person box is present
    pub close_approach: bool,
}

impl Observations {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now,
            qualifies: false,
            streak: 0,
            intent: IntentObservation::NotConsulted,
            utterance: None,
            phrase_match: false,
            verdict: None,
            guard_expired: false,
            close_approach: false,
        }
    }
}

/// Scripted lines the controller can speak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    PasswordPrompt,
    PasswordAccepted,
    PasswordRejected,
    PackageTooBig,
    DeliveryThanks,
    HatchClosing,
    /// Chosen uniformly from the warning set at execution time
    RandomWarning,
}

impl Line {
    /// Fixed text, or `None` for lines resolved at execution time
    pub fn text(self) -> Option<&'static str> {
        match self {
            Line::PasswordPrompt => Some(LINE_PASSWORD_PROMPT),
            Line::PasswordAccepted => Some(LINE_PASSWORD_ACCEPTED),
            Line::PasswordRejected => Some(LINE_PASSWORD_REJECTED),
            Line::PackageTooBig => Some(LINE_PACKAGE_TOO_BIG),
            Line::DeliveryThanks => Some(LINE_DELIVERY_THANKS),
            Line::HatchClosing => Some(LINE_HATCH_CLOSING),
            Line::RandomWarning => None,
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            Line::PasswordRejected | Line::RandomWarning => Tone::Aggressive,
            _ => Tone::Friendly,
        }
    }
}

/// One requested effect or internal timer operation, executed in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Speak(Line),
    LogIncident { mode: GuardMode },
    SignalDeterrent,
    Hold { seconds: u64 },
    StartGuardTimer,
    ClearGuardTimer,
}

/// Result of the pure decision step
#[derive(Debug, Clone)]
pub struct Decision {
    pub encounter: Encounter,
    pub reason: ReasonCode,
    pub directives: Vec<Directive>,
}

/// Pure decision function: current encounter + observations in, next
/// encounter + ordered directives out. No adapter access, no clock
/// access beyond `obs.now`, no randomness.
pub fn decide(encounter: &Encounter, obs: &Observations) -> Decision {
    let mut next = encounter.clone();

    match encounter.state {
        EncounterState::Idle => match obs.intent {
            IntentObservation::NotConsulted => {
                next.streak = obs.streak;
                let reason = if obs.qualifies {
                    ReasonCode::R101_DWELL_ACCUMULATING
                } else if encounter.streak > 0 {
                    ReasonCode::R101_DWELL_RESET
                } else {
                    ReasonCode::R101_IDLE_QUIET
                };
                Decision {
                    encounter: next,
                    reason,
                    directives: vec![],
                }
            }
            IntentObservation::Confirmed => {
                next.begin(obs.now);
                Decision {
                    encounter: next,
                    reason: ReasonCode::R201_INTENT_CONFIRMED,
                    directives: vec![Directive::Speak(Line::PasswordPrompt)],
                }
            }
            IntentObservation::Rejected | IntentObservation::Failed => {
                next.streak = 0;
                let reason = if obs.intent == IntentObservation::Rejected {
                    ReasonCode::R201_INTENT_REJECTED
                } else {
                    ReasonCode::R201_ORACLE_FAILED
                };
                Decision {
                    encounter: next,
                    reason,
                    directives: vec![Directive::Hold {
                        seconds: FALSE_ALARM_BACKOFF_SECS,
                    }],
                }
            }
        },

        EncounterState::Verifying => {
            let utterance = obs.utterance.as_deref().unwrap_or("");
            if utterance.is_empty() {
                next.reset();
                Decision {
                    encounter: next,
                    reason: ReasonCode::R301_CAPTURE_SILENT,
                    directives: vec![],
                }
            } else if obs.phrase_match {
                next.enter_receiving();
                Decision {
                    encounter: next,
                    reason: ReasonCode::R301_PHRASE_ACCEPTED,
                    directives: vec![Directive::Speak(Line::PasswordAccepted)],
                }
            } else {
                next.enter_guarding(GuardMode::WrongPassword);
                Decision {
                    encounter: next,
                    reason: ReasonCode::R301_PHRASE_REJECTED,
                    directives: vec![
                        Directive::Speak(Line::PasswordRejected),
                        Directive::StartGuardTimer,
                    ],
                }
            }
        }

        EncounterState::Receiving => {
            let utterance = obs.utterance.as_deref().unwrap_or("");
            if utterance.is_empty() {
                next.reset();
                Decision {
                    encounter: next,
                    reason: ReasonCode::R401_COURIER_SILENT,
                    directives: vec![
                        Directive::Speak(Line::HatchClosing),
                        Directive::Hold {
                            seconds: HATCH_CLOSE_HOLD_SECS,
                        },
                    ],
                }
            } else {
                match obs.verdict.unwrap_or(PackageVerdict::Unknown) {
                    PackageVerdict::TooBig => {
                        next.enter_guarding(GuardMode::PackageGuard);
                        Decision {
                            encounter: next,
                            reason: ReasonCode::R401_PACKAGE_TOO_BIG,
                            directives: vec![Directive::Speak(Line::PackageTooBig)],
                        }
                    }
                    verdict => {
                        next.reset();
                        let reason = if verdict == PackageVerdict::Done {
                            ReasonCode::R401_DELIVERY_DONE
                        } else {
                            ReasonCode::R401_STATUS_UNKNOWN
                        };
                        Decision {
                            encounter: next,
                            reason,
                            directives: vec![
                                Directive::Speak(Line::DeliveryThanks),
                                Directive::Hold {
                                    seconds: DELIVERY_FAREWELL_HOLD_SECS,
                                },
                            ],
                        }
                    }
                }
            }
        }

        EncounterState::Guarding => {
            if obs.guard_expired {
                next.reset();
                Decision {
                    encounter: next,
                    reason: ReasonCode::R501_PENALTY_EXPIRED,
                    directives: vec![Directive::ClearGuardTimer],
                }
            } else if obs.close_approach {
                next.deterrence_count += 1;
                let mut directives = vec![
                    Directive::Speak(Line::RandomWarning),
                    Directive::LogIncident {
                        mode: encounter.guard_mode.unwrap_or(GuardMode::PackageGuard),
                    },
                    Directive::SignalDeterrent,
                    Directive::Hold {
                        seconds: DETERRENCE_COOLDOWN_SECS,
                    },
                ];
                // Restart comes after the cooldown hold, so the penalty
                // window cannot expire mid-sequence
                if encounter.guard_mode == Some(GuardMode::WrongPassword) {
                    directives.push(Directive::StartGuardTimer);
                }
                Decision {
                    encounter: next,
                    reason: ReasonCode::R501_CLOSE_APPROACH,
                    directives,
                }
            } else {
                Decision {
                    encounter: next,
                    reason: ReasonCode::R501_GUARD_WATCHING,
                    directives: vec![],
                }
            }
        }
    }
}

/// The decision core: owns the encounter, the debounce counter, and the
/// guard timer. One `tick` per frame.
pub struct WardenEngine {
    encounter: Encounter,
    debounce: DebounceCounter,
    timer: GuardTimer,
    matcher: PhraseMatcher,
    tick_count: u64,
}

impl WardenEngine {
    /// Create new engine with the default penalty window
    pub fn new(secret: &str) -> Self {
        Self {
            encounter: Encounter::new(),
            debounce: DebounceCounter::new(),
            timer: GuardTimer::new(),
            matcher: PhraseMatcher::new(secret),
            tick_count: 0,
        }
    }

    /// Create engine with a custom penalty window
    pub fn with_guard_window(secret: &str, window: Duration) -> Self {
        Self {
            encounter: Encounter::new(),
            debounce: DebounceCounter::new(),
            timer: GuardTimer::with_threshold(window),
            matcher: PhraseMatcher::new(secret),
            tick_count: 0,
        }
    }

    /// Process one frame: gather, decide, execute
    pub fn tick(&mut self, frame: &CameraFrame, periphery: &mut Periphery) -> TickOutput {
        self.tick_count += 1;
        let state_before = self.encounter.state;

        let (obs, seen) = self.gather(frame, periphery);
        let decision = decide(&self.encounter, &obs);
        let actions = self.execute(&decision, periphery);
        self.encounter = decision.encounter;

        if state_before != self.encounter.state {
            tracing::info!(
                from = %state_before,
                to = %self.encounter.state,
                reason = decision.reason.code(),
                "state change"
            );
        }

        let mut output = TickOutput::new(
            state_before,
            self.encounter.state,
            self.encounter.guard_mode,
            self.encounter.streak,
            seen,
            decision.reason,
            actions,
        );
        output.guard_countdown = self.guard_countdown();
        output
    }

    /// Seconds left on the penalty window, rounded up, while it runs.
    /// Only a wrong-password guard ever starts the timer.
    fn guard_countdown(&self) -> Option<u64> {
        self.timer.remaining().map(|left| {
            let mut seconds = left.as_secs();
            if left.subsec_nanos() > 0 {
                seconds += 1;
            }
            seconds
        })
    }

    /// Stage the inputs the current state needs
    fn gather(
        &mut self,
        frame: &CameraFrame,
        periphery: &mut Periphery,
    ) -> (Observations, String) {
        let mut obs = Observations::at(Utc::now());
        let mut seen = String::from("-");

        match self.encounter.state {
            EncounterState::Idle => {
                let detections = periphery.detector.detect(frame, CONFIDENCE_SCAN);
                seen = detections.summary();
                obs.qualifies = detections.has_delivery_candidate();
                obs.streak = self.debounce.observe(obs.qualifies);

                if self.debounce.confirmed() {
                    obs.intent = match periphery.oracle.verify_delivery_intent(frame) {
                        Ok(true) => IntentObservation::Confirmed,
                        Ok(false) => IntentObservation::Rejected,
                        Err(err) => {
                            tracing::warn!(%err, "intent oracle failed, treating as rejection");
                            IntentObservation::Failed
                        }
                    };
                    // Counter restarts regardless of the verdict
                    self.debounce.reset();
                    obs.streak = 0;
                }
            }

            EncounterState::Verifying => {
                let utterance = periphery.mic.capture();
                obs.phrase_match = self.matcher.matches(&utterance);
                obs.utterance = Some(utterance);
            }

            EncounterState::Receiving => {
                let utterance = periphery.mic.capture();
                if !utterance.is_empty() {
                    obs.verdict =
                        Some(match periphery.oracle.classify_package_status(&utterance) {
                            Ok(verdict) => verdict,
                            Err(err) => {
                                tracing::warn!(%err, "status oracle failed, treating as unknown");
                                PackageVerdict::Unknown
                            }
                        });
                }
                obs.utterance = Some(utterance);
            }

            EncounterState::Guarding => {
                let timed = self.encounter.guard_mode == Some(GuardMode::WrongPassword);
                if timed && self.timer.expired() {
                    // Skip detection entirely on the expiry tick
                    obs.guard_expired = true;
                } else {
                    let detections = periphery.detector.detect(frame, CONFIDENCE_GUARD);
                    seen = detections.summary();
                    obs.close_approach = detections
                        .oversized_persons(OVERSIZE_HEIGHT_RATIO)
                        .next()
                        .is_some();
                }
            }
        }

        (obs, seen)
    }

    /// Run the decided directives in order, swallowing adapter failures
    fn execute(&mut self, decision: &Decision, periphery: &mut Periphery) -> Vec<Action> {
        let mut actions = Vec::new();
        let mut last_warning: Option<String> = None;

        for directive in &decision.directives {
            match directive {
                Directive::Speak(line) => {
                    let text = match line.text() {
                        Some(text) => text.to_string(),
                        None => pick_warning(&mut periphery.rng),
                    };
                    if *line == Line::RandomWarning {
                        last_warning = Some(text.clone());
                    }
                    let tone = line.tone();
                    if let Err(err) = periphery.voice.speak(&text, tone) {
                        tracing::warn!(%err, "voice failed, continuing");
                    }
                    actions.push(Action::Spoke { tone, text });
                }

                Directive::LogIncident { mode } => {
                    let record = IncidentRecord::new(
                        Utc::now(),
                        *mode,
                        "close_approach",
                        last_warning.clone().unwrap_or_default(),
                        decision.encounter.deterrence_count,
                    );
                    let receipt = match periphery.ledger.append(&record) {
                        Ok(Some(receipt)) => Some(receipt.digest),
                        Ok(None) => None,
                        Err(err) => {
                            tracing::warn!(%err, "ledger append failed, continuing");
                            None
                        }
                    };
                    actions.push(Action::IncidentLogged { receipt });
                }

                Directive::SignalDeterrent => {
                    if let Err(err) = periphery.link.signal(ATTACK_COMMAND) {
                        tracing::warn!(%err, "actuator link failed, continuing");
                    }
                    actions.push(Action::DeterrentFired);
                }

                Directive::Hold { seconds } => {
                    periphery.pacer.hold(Duration::from_secs(*seconds));
                    actions.push(Action::Held { seconds: *seconds });
                }

                Directive::StartGuardTimer => self.timer.start(),
                Directive::ClearGuardTimer => self.timer.clear(),
            }
        }

        actions
    }

    /// Current encounter record
    pub fn encounter(&self) -> &Encounter {
        &self.encounter
    }

    /// Current state
    pub fn state(&self) -> EncounterState {
        self.encounter.state
    }

    /// Number of ticks processed
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Back to a fresh idle encounter
    pub fn reset(&mut self) {
        self.encounter.reset();
        self.debounce.reset();
        self.timer.clear();
    }
}

fn pick_warning(rng: &mut StdRng) -> String {
    WARNING_LINES
        .choose(rng)
        .copied()
        .unwrap_or(WARNING_LINES[0])
        .to_string()
}

// =============================================================================
// TESTS
// =============================================================================
