//! Integration tests for the HTTP status API
//!
//! Exercises the read-only surface over a status board, both at startup
//! and after a frame loop has published real ticks.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;

use warden0::core::{
    create_router, DetectError, DetectorHandle, FrameLoop, InstantPacer, MemoryLedger, NullLink,
    NullVoice, Periphery, ScriptedDetector, ScriptedMic, ScriptedOracle, StatusBoard,
    SyntheticFrames, WardenEngine,
};
use warden0::types::{
    Action, BoundingBox, Detection, DetectionFrame, Encounter, EncounterState, GuardMode, Label,
    ReasonCode, TickOutput, Tone,
};

fn courier_script(frames: usize) -> Vec<Result<DetectionFrame, DetectError>> {
    (0..frames)
        .map(|_| {
            Ok(DetectionFrame::with_detections(
                480.0,
                vec![
                    Detection {
                        label: Label::Person,
                        bbox: BoundingBox::new(200.0, 120.0, 320.0, 330.0),
                        confidence: 0.62,
                    },
                    Detection {
                        label: Label::CardboardBox,
                        bbox: BoundingBox::new(240.0, 260.0, 310.0, 330.0),
                        confidence: 0.48,
                    },
                ],
            ))
        })
        .collect()
}

async fn get_json(router: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_endpoint() {
    let board = Arc::new(StatusBoard::new());
    let (status, json) = get_json(create_router(board), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["ticks"], 0);
}

#[tokio::test]
async fn test_status_startup_snapshot() {
    let board = Arc::new(StatusBoard::new());
    let (status, json) = get_json(create_router(board), "/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"], "IDLE");
    assert!(json["guard_mode"].is_null());
    assert_eq!(json["streak"], 0);
    assert_eq!(json["deterrence_count"], 0);
    assert!(json["reason"].is_null());
    assert_eq!(json["ticks"], 0);
}

#[tokio::test]
async fn test_status_reflects_a_live_encounter() {
    // Six scripted ticks ending in wrong-password guarding
    let board = Arc::new(StatusBoard::new());
    let periphery = Periphery::new(
        DetectorHandle::new(Box::new(ScriptedDetector::new(courier_script(5)))),
        Box::new(ScriptedOracle::new().push_intent(Ok(true))),
        Box::new(ScriptedMic::new(["definitely wrong"])),
        Box::new(NullVoice),
        Box::new(NullLink),
        Box::new(MemoryLedger::new()),
        Box::new(InstantPacer::new()),
    )
    .with_seed(3);

    let engine = WardenEngine::new("open");
    let source = SyntheticFrames::new(640, 480).with_limit(6);
    let mut frame_loop = FrameLoop::new(engine, periphery, Box::new(source))
        .with_board(board.clone())
        .with_output(false, true, false);
    let summary = frame_loop.run();
    assert_eq!(summary.ticks, 6);

    let (status, json) = get_json(create_router(board), "/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"], "GUARDING");
    assert_eq!(json["guard_mode"], "WRONG_PASSWORD");
    assert_eq!(json["reason"], "R301_PHRASE_REJECTED");
    assert_eq!(json["ticks"], 6);
    assert_eq!(json["deterrence_count"], 0);
    assert!(json["started_at"].is_string(), "encounter start is stamped");
}

#[tokio::test]
async fn test_board_broadcasts_each_published_tick() {
    let board = StatusBoard::new();
    let mut rx = board.subscribe();

    let mut encounter = Encounter::new();
    encounter.enter_guarding(GuardMode::PackageGuard);
    encounter.deterrence_count = 1;

    let output = TickOutput::new(
        EncounterState::Guarding,
        EncounterState::Guarding,
        Some(GuardMode::PackageGuard),
        0,
        "other".to_string(),
        ReasonCode::R501_CLOSE_APPROACH,
        vec![Action::Spoke {
            tone: Tone::Aggressive,
            text: "Intruder detected. You are being recorded.".to_string(),
        }],
    );
    board.publish(&output, &encounter, 12);

    let update = rx.recv().await.unwrap();
    assert_eq!(update.state, "GUARDING");
    assert_eq!(update.guard_mode.as_deref(), Some("PACKAGE_GUARD"));
    assert_eq!(update.reason, "R501_CLOSE_APPROACH");
    assert_eq!(update.actions, 1);

    let snapshot = board.snapshot();
    assert_eq!(snapshot.state, "GUARDING");
    assert_eq!(snapshot.deterrence_count, 1);
    assert_eq!(snapshot.ticks, 12);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let board = Arc::new(StatusBoard::new());
    let response = create_router(board)
        .oneshot(
            Request::builder()
                .uri("/session/anything")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
