//! HTTP + WebSocket status API for Warden-0
//!
//! Read-only observability surface over the single live encounter. It
//! never feeds back into decisions.
//!
//! Endpoints:
//! - GET /health - Health check
//! - GET /status - Current controller status
//! - WS /ws - Live tick updates

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

use crate::types::{Encounter, EncounterState, TickOutput};

/// Latest published controller status
#[derive(Debug, Clone, Serialize)]
pub struct ControllerStatus {
    pub state: String,
    pub guard_mode: Option<String>,
    pub streak: u32,
    pub deterrence_count: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub seen: String,
    pub reason: Option<String>,
    pub ticks: u64,
    pub updated_at: DateTime<Utc>,
}

impl ControllerStatus {
    fn startup() -> Self {
        Self {
            state: EncounterState::Idle.to_string(),
            guard_mode: None,
            streak: 0,
            deterrence_count: 0,
            started_at: None,
            seen: "-".to_string(),
            reason: None,
            ticks: 0,
            updated_at: Utc::now(),
        }
    }
}

/// Live update message, one per tick
#[derive(Debug, Clone, Serialize)]
pub struct TickUpdate {
    pub state: String,
    pub guard_mode: Option<String>,
    pub streak: u32,
    pub seen: String,
    pub reason: String,
    pub actions: usize,
    pub timestamp: DateTime<Utc>,
}

/// Shared board the frame loop writes and the API reads. The writer is
/// a plain thread, so the snapshot lock is sync; only the broadcast
/// side is async-aware.
pub struct StatusBoard {
    status: RwLock<ControllerStatus>,
    update_tx: broadcast::Sender<TickUpdate>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBoard {
    pub fn new() -> Self {
        let (update_tx, _) = broadcast::channel(100);
        Self {
            status: RwLock::new(ControllerStatus::startup()),
            update_tx,
        }
    }

    /// Publish one processed tick
    pub fn publish(&self, output: &TickOutput, encounter: &Encounter, ticks: u64) {
        let status = ControllerStatus {
            state: output.state.to_string(),
            guard_mode: output.guard_mode.map(|m| m.to_string()),
            streak: output.streak,
            deterrence_count: encounter.deterrence_count,
            started_at: encounter.started_at,
            seen: output.seen.clone(),
            reason: Some(output.reason.code().to_string()),
            ticks,
            updated_at: output.timestamp,
        };

        if let Ok(mut guard) = self.status.write() {
            *guard = status;
        }

        let update = TickUpdate {
            state: output.state.to_string(),
            guard_mode: output.guard_mode.map(|m| m.to_string()),
            streak: output.streak,
            seen: output.seen.clone(),
            reason: output.reason.code().to_string(),
            actions: output.actions.len(),
            timestamp: output.timestamp,
        };
        let _ = self.update_tx.send(update);
    }

    /// Current status snapshot
    pub fn snapshot(&self) -> ControllerStatus {
        match self.status.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TickUpdate> {
        self.update_tx.subscribe()
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub ticks: u64,
}

/// Create the API router
pub fn create_router(board: Arc<StatusBoard>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/ws", get(websocket_handler))
        .with_state(board)
}

/// Health check endpoint
async fn health(State(board): State<Arc<StatusBoard>>) -> Json<HealthResponse> {
    let snapshot = board.snapshot();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        ticks: snapshot.ticks,
    })
}

/// Current controller status
async fn status(State(board): State<Arc<StatusBoard>>) -> Json<ControllerStatus> {
    Json(board.snapshot())
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(board): State<Arc<StatusBoard>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let rx = board.subscribe();
    ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    })
}

/// Forward tick updates until the client goes away
async fn handle_websocket(socket: WebSocket, mut rx: broadcast::Receiver<TickUpdate>) {
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            update = rx.recv() => {
                let Ok(update) = update else { break };
                let json = serde_json::to_string(&update).unwrap_or_default();
                if sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
            message = receiver.next() => {
                // Inbound messages are ignored; a close or error ends the task
                match message {
                    None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

/// Run the API server
pub async fn run_server(
    addr: &str,
    board: Arc<StatusBoard>,
) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router(board);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("👁 Warden-0 status API running on {}", addr);
    println!("  GET  /health - Health check");
    println!("  GET  /status - Controller status");
    println!("  WS   /ws     - Live tick updates");
    axum::serve(listener, router).await?;
    Ok(())
}
