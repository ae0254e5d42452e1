//! Integration tests for guarding behavior
//!
//! - Wrong-password penalty window: self-clear, restart after episodes
//! - Package guard: no programmed exit
//! - Deterrence episodes: one per tick, warning + ledger + hardware signal
//! - Incident records and receipts

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::thread::sleep;
use std::time::Duration;

use warden0::core::{
    CameraFrame, DetectError, DetectorHandle, InstantPacer, MemoryLedger, NullLink, NullVoice,
    Periphery, ScriptedDetector, ScriptedMic, ScriptedOracle, WardenEngine, WriterLink,
};
use warden0::types::{
    Action, BoundingBox, Detection, DetectionFrame, EncounterState, GuardMode, Label,
    PackageVerdict, ReasonCode, Tone,
};
use warden0::{
    ATTACK_COMMAND, DETERRENCE_COOLDOWN_SECS, WARNING_LINES, WRONG_PASSWORD_TIMEOUT_SECS,
};

fn frame(sequence: u64) -> CameraFrame {
    CameraFrame::new(sequence, 640, 480)
}

fn courier_frame() -> DetectionFrame {
    DetectionFrame::with_detections(
        480.0,
        vec![
            Detection {
                label: Label::Person,
                bbox: BoundingBox::new(200.0, 120.0, 320.0, 330.0),
                confidence: 0.62,
            },
            Detection {
                label: Label::DeliveryPackage,
                bbox: BoundingBox::new(240.0, 260.0, 310.0, 330.0),
                confidence: 0.55,
            },
        ],
    )
}

/// One person box spanning three quarters of the frame height
fn prowler_frame() -> DetectionFrame {
    DetectionFrame::with_detections(
        480.0,
        vec![Detection {
            label: Label::Person,
            bbox: BoundingBox::new(180.0, 60.0, 360.0, 420.0),
            confidence: 0.71,
        }],
    )
}

/// Three oversized people at once
fn crowd_frame() -> DetectionFrame {
    let person = |x1: f32| Detection {
        label: Label::Person,
        bbox: BoundingBox::new(x1, 60.0, x1 + 120.0, 420.0),
        confidence: 0.66,
    };
    DetectionFrame::with_detections(480.0, vec![person(40.0), person(220.0), person(400.0)])
}

fn courier_script(frames: usize) -> Vec<Result<DetectionFrame, DetectError>> {
    (0..frames).map(|_| Ok(courier_frame())).collect()
}

/// Hardware link buffer that stays readable after the periphery takes
/// the writer
#[derive(Clone)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }

    fn contents(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct GuardRig {
    engine: WardenEngine,
    periphery: Periphery,
    ledger: MemoryLedger,
    wire: SharedBuf,
}

/// Walks an engine into GUARDING with the given detector script queued
/// for the guard ticks. `wrong_password` picks the mode: a failed
/// passphrase or an oversized package.
fn guard_rig(
    window: Option<Duration>,
    wrong_password: bool,
    guard_script: Vec<Result<DetectionFrame, DetectError>>,
) -> GuardRig {
    let mut script = courier_script(5);
    script.extend(guard_script);

    let ledger = MemoryLedger::new();
    let wire = SharedBuf::new();

    let mut oracle = ScriptedOracle::new().push_intent(Ok(true));
    let mic = if wrong_password {
        ScriptedMic::new(vec!["not the phrase".to_string()])
    } else {
        oracle = oracle.push_verdict(Ok(PackageVerdict::TooBig));
        ScriptedMic::new(vec!["open".to_string(), "it is too big".to_string()])
    };

    let mut periphery = Periphery::new(
        DetectorHandle::new(Box::new(ScriptedDetector::new(script))),
        Box::new(oracle),
        Box::new(mic),
        Box::new(NullVoice),
        Box::new(WriterLink::new(wire.clone())),
        Box::new(ledger.clone()),
        Box::new(InstantPacer::new()),
    )
    .with_seed(42);

    let mut engine = match window {
        Some(window) => WardenEngine::with_guard_window("open", window),
        None => WardenEngine::new("open"),
    };

    let entry_ticks = if wrong_password { 6 } else { 7 };
    let mut last = None;
    for seq in 1..=entry_ticks {
        last = Some(engine.tick(&frame(seq), &mut periphery));
    }
    let last = last.unwrap();
    assert_eq!(last.state, EncounterState::Guarding);
    let expected = if wrong_password {
        GuardMode::WrongPassword
    } else {
        GuardMode::PackageGuard
    };
    assert_eq!(last.guard_mode, Some(expected));

    GuardRig {
        engine,
        periphery,
        ledger,
        wire,
    }
}

// =============================================================================
// PENALTY WINDOW
// =============================================================================

#[test]
fn test_wrong_password_window_self_clears() {
    let mut rig = guard_rig(
        Some(Duration::from_millis(80)),
        true,
        vec![Ok(prowler_frame())],
    );

    sleep(Duration::from_millis(160));
    let out = rig.engine.tick(&frame(7), &mut rig.periphery);

    assert_eq!(out.state, EncounterState::Idle);
    assert_eq!(out.reason, ReasonCode::R501_PENALTY_EXPIRED);
    assert!(out.actions.is_empty(), "stand-down is silent");
    assert_eq!(out.guard_countdown, None, "cleared window leaves the line");
    // The queued prowler frame was never consumed: the expiry tick
    // skips detection entirely
    assert_eq!(out.seen, "-");
    assert_eq!(rig.engine.state(), EncounterState::Idle);
}

#[test]
fn test_episode_restarts_the_penalty_window() {
    let window = Duration::from_millis(300);
    let mut rig = guard_rig(
        Some(window),
        true,
        vec![Ok(prowler_frame()), Ok(DetectionFrame::empty(480.0))],
    );

    // Episode fires well inside the window and restarts it
    sleep(Duration::from_millis(150));
    let episode = rig.engine.tick(&frame(7), &mut rig.periphery);
    assert_eq!(episode.reason, ReasonCode::R501_CLOSE_APPROACH);

    // 350ms past guard entry but only 200ms past the restart
    sleep(Duration::from_millis(200));
    let watching = rig.engine.tick(&frame(8), &mut rig.periphery);
    assert_eq!(watching.state, EncounterState::Guarding);
    assert_eq!(watching.reason, ReasonCode::R501_GUARD_WATCHING);

    // Long past the restarted window
    sleep(Duration::from_millis(500));
    let cleared = rig.engine.tick(&frame(9), &mut rig.periphery);
    assert_eq!(cleared.state, EncounterState::Idle);
    assert_eq!(cleared.reason, ReasonCode::R501_PENALTY_EXPIRED);
}

#[test]
fn test_package_guard_never_expires() {
    let mut rig = guard_rig(Some(Duration::from_millis(50)), false, vec![]);

    sleep(Duration::from_millis(150));
    let out = rig.engine.tick(&frame(8), &mut rig.periphery);
    assert_eq!(out.state, EncounterState::Guarding);
    assert_eq!(out.guard_mode, Some(GuardMode::PackageGuard));
    assert_eq!(out.reason, ReasonCode::R501_GUARD_WATCHING);

    sleep(Duration::from_millis(150));
    let out = rig.engine.tick(&frame(9), &mut rig.periphery);
    assert_eq!(out.state, EncounterState::Guarding, "no programmed exit");
}

// =============================================================================
// DETERRENCE EPISODES
// =============================================================================

#[test]
fn test_episode_warns_logs_and_fires_in_order() {
    let mut rig = guard_rig(None, true, vec![Ok(prowler_frame())]);

    let out = rig.engine.tick(&frame(7), &mut rig.periphery);

    assert_eq!(out.state, EncounterState::Guarding);
    assert_eq!(out.reason, ReasonCode::R501_CLOSE_APPROACH);
    assert_eq!(out.actions.len(), 4);

    let warning = match &out.actions[0] {
        Action::Spoke { tone, text } => {
            assert_eq!(*tone, Tone::Aggressive);
            assert!(
                WARNING_LINES.contains(&text.as_str()),
                "warning must come from the fixed set, got {:?}",
                text
            );
            text.clone()
        }
        other => panic!("expected a spoken warning first, got {:?}", other),
    };

    match &out.actions[1] {
        Action::IncidentLogged { receipt } => {
            let digest = receipt.as_ref().expect("memory ledger returns receipts");
            assert_eq!(digest.len(), 64);
            assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        }
        other => panic!("expected the ledger append second, got {:?}", other),
    }

    assert_eq!(out.actions[2], Action::DeterrentFired);
    assert_eq!(
        out.actions[3],
        Action::Held {
            seconds: DETERRENCE_COOLDOWN_SECS
        }
    );

    // Exactly one command went over the wire
    assert_eq!(rig.wire.contents(), ATTACK_COMMAND);

    // The record ties the episode together
    let records = rig.ledger.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].guard_mode, GuardMode::WrongPassword);
    assert_eq!(records[0].trigger, "close_approach");
    assert_eq!(records[0].warning, warning);
    assert_eq!(records[0].episode, 1);

    // The receipt digest and the restarted window reach the operator line
    let digest = out.receipt_digest().expect("episode carries a receipt");
    assert!(out.to_terminal_string().contains(digest));
    assert!(out.to_parseable_string().contains(digest));
    assert_eq!(out.guard_countdown, Some(WRONG_PASSWORD_TIMEOUT_SECS));
}

#[test]
fn test_crowd_triggers_a_single_episode() {
    let mut rig = guard_rig(None, true, vec![Ok(crowd_frame())]);

    let out = rig.engine.tick(&frame(7), &mut rig.periphery);

    let spoke = out
        .actions
        .iter()
        .filter(|a| matches!(a, Action::Spoke { .. }))
        .count();
    let fired = out
        .actions
        .iter()
        .filter(|a| matches!(a, Action::DeterrentFired))
        .count();
    assert_eq!(spoke, 1, "one warning for the whole crowd");
    assert_eq!(fired, 1, "one hardware signal for the whole crowd");
    assert_eq!(rig.ledger.records().len(), 1);
    assert_eq!(rig.wire.contents(), ATTACK_COMMAND);
}

#[test]
fn test_episodes_number_up_across_ticks() {
    // Package guard has no timer to interfere with back-to-back episodes
    let mut rig = guard_rig(
        None,
        false,
        vec![Ok(prowler_frame()), Ok(prowler_frame())],
    );

    let first = rig.engine.tick(&frame(8), &mut rig.periphery);
    let second = rig.engine.tick(&frame(9), &mut rig.periphery);
    assert_eq!(first.reason, ReasonCode::R501_CLOSE_APPROACH);
    assert_eq!(second.reason, ReasonCode::R501_CLOSE_APPROACH);

    let records = rig.ledger.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].episode, 1);
    assert_eq!(records[1].episode, 2);
    assert_eq!(records[0].guard_mode, GuardMode::PackageGuard);
    assert_eq!(records[1].guard_mode, GuardMode::PackageGuard);
    assert_eq!(rig.engine.encounter().deterrence_count, 2);

    // Two commands on the wire, one per episode
    let mut expected = ATTACK_COMMAND.to_vec();
    expected.extend_from_slice(ATTACK_COMMAND);
    assert_eq!(rig.wire.contents(), expected);
}

#[test]
fn test_package_guard_episode_skips_the_timer_restart() {
    // A tiny window plus an episode: if the episode armed the timer,
    // the next tick would clear the guard
    let mut rig = guard_rig(
        Some(Duration::from_millis(40)),
        false,
        vec![Ok(prowler_frame()), Ok(DetectionFrame::empty(480.0))],
    );

    let episode = rig.engine.tick(&frame(8), &mut rig.periphery);
    assert_eq!(episode.reason, ReasonCode::R501_CLOSE_APPROACH);

    sleep(Duration::from_millis(120));
    let after = rig.engine.tick(&frame(9), &mut rig.periphery);
    assert_eq!(after.state, EncounterState::Guarding);
    assert_eq!(after.reason, ReasonCode::R501_GUARD_WATCHING);
}

// =============================================================================
// DEGRADED HARDWARE
// =============================================================================

#[test]
fn test_episode_survives_a_missing_link() {
    // Same walk but with no hardware link at all
    let mut script = courier_script(5);
    script.push(Ok(prowler_frame()));
    let ledger = MemoryLedger::new();

    let mut periphery = Periphery::new(
        DetectorHandle::new(Box::new(ScriptedDetector::new(script))),
        Box::new(ScriptedOracle::new().push_intent(Ok(true))),
        Box::new(ScriptedMic::new(["wrong phrase entirely"])),
        Box::new(NullVoice),
        Box::new(NullLink),
        Box::new(ledger.clone()),
        Box::new(InstantPacer::new()),
    )
    .with_seed(42);
    let mut engine = WardenEngine::new("open");

    for seq in 1..=6 {
        engine.tick(&frame(seq), &mut periphery);
    }
    let out = engine.tick(&frame(7), &mut periphery);

    // The episode still completes and still gets recorded
    assert_eq!(out.reason, ReasonCode::R501_CLOSE_APPROACH);
    assert!(out.actions.contains(&Action::DeterrentFired));
    assert_eq!(ledger.records().len(), 1);
}
