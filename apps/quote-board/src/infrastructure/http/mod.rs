//! Board HTTP Server
//!
//! Read-only view of the board plus health, metrics and a reconnect control.
//!
//! # Endpoints
//!
//! - `GET /board` - HTML rendering of the current board
//! - `GET /status` - JSON session summary
//! - `GET /healthz` - Liveness probe (simple OK)
//! - `GET /readyz` - Readiness probe (200 only while connected)
//! - `GET /metrics` - Prometheus metrics in text format
//! - `POST /reconnect` - Ask the session to open the feed again

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::domain::session::{ConnectionState, StatusLine};
use crate::infrastructure::board::BoardSnapshot;
use crate::infrastructure::feed::ControlCommand;
use crate::infrastructure::metrics::get_metrics_handle;

/// `GET /status` body.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    /// Connection state.
    pub state: ConnectionState,
    /// Whether the feed is connected.
    pub connected: bool,
    /// Messages since the transport last opened.
    pub message_count: u64,
    /// Attached instrument panels.
    pub panel_count: usize,
    /// Active renderer.
    pub renderer: &'static str,
    /// Status readout.
    pub status: StatusLine,
    /// Client version.
    pub version: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
    /// When the board was last published.
    pub updated_at: DateTime<Utc>,
}

/// Shared state for the board server.
pub struct BoardServerState {
    version: String,
    started_at: Instant,
    snapshots: watch::Receiver<BoardSnapshot>,
    control_tx: mpsc::Sender<ControlCommand>,
}

impl BoardServerState {
    /// Create new server state.
    #[must_use]
    pub fn new(
        version: String,
        snapshots: watch::Receiver<BoardSnapshot>,
        control_tx: mpsc::Sender<ControlCommand>,
    ) -> Self {
        Self {
            version,
            started_at: Instant::now(),
            snapshots,
            control_tx,
        }
    }

    fn status(&self) -> StatusResponse {
        let snapshot = self.snapshots.borrow();
        StatusResponse {
            state: snapshot.board.state,
            connected: snapshot.board.state == ConnectionState::Connected,
            message_count: snapshot.board.message_count,
            panel_count: snapshot.panels.len(),
            renderer: snapshot.board.renderer,
            status: snapshot.status.clone(),
            version: self.version.clone(),
            uptime_secs: self.started_at.elapsed().as_secs(),
            updated_at: snapshot.taken_at,
        }
    }
}

/// Build the board router.
pub fn router(state: Arc<BoardServerState>) -> Router {
    Router::new()
        .route("/board", get(board_handler))
        .route("/status", get(status_handler))
        .route("/healthz", get(liveness_handler))
        .route("/readyz", get(readiness_handler))
        .route("/metrics", get(metrics_handler))
        .route("/reconnect", post(reconnect_handler))
        .with_state(state)
}

/// Board HTTP server.
pub struct BoardServer {
    port: u16,
    state: Arc<BoardServerState>,
    cancel: CancellationToken,
}

impl BoardServer {
    /// Create a new board server.
    #[must_use]
    pub const fn new(port: u16, state: Arc<BoardServerState>, cancel: CancellationToken) -> Self {
        Self {
            port,
            state,
            cancel,
        }
    }

    /// Run the server until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `BoardServerError` if binding fails or the HTTP server
    /// encounters a fatal error while running.
    pub async fn run(self) -> Result<(), BoardServerError> {
        let app = router(self.state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| BoardServerError::BindFailed(self.port, e.to_string()))?;

        tracing::info!(port = self.port, "Board server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| BoardServerError::ServerFailed(e.to_string()))?;

        tracing::info!("Board server stopped");
        Ok(())
    }
}

async fn board_handler(State(state): State<Arc<BoardServerState>>) -> impl IntoResponse {
    Html(state.snapshots.borrow().to_html())
}

async fn status_handler(State(state): State<Arc<BoardServerState>>) -> impl IntoResponse {
    Json(state.status())
}

async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn readiness_handler(State(state): State<Arc<BoardServerState>>) -> impl IntoResponse {
    if state.snapshots.borrow().board.state == ConnectionState::Connected {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}

async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                handle.render(),
            )
        },
    )
}

async fn reconnect_handler(State(state): State<Arc<BoardServerState>>) -> impl IntoResponse {
    match state.control_tx.try_send(ControlCommand::Reconnect) {
        Ok(()) => (StatusCode::ACCEPTED, "ACCEPTED"),
        Err(mpsc::error::TrySendError::Full(_)) => (StatusCode::TOO_MANY_REQUESTS, "BUSY"),
        Err(mpsc::error::TrySendError::Closed(_)) => {
            (StatusCode::SERVICE_UNAVAILABLE, "SESSION STOPPED")
        }
    }
}

/// Board server errors.
#[derive(Debug, thiserror::Error)]
pub enum BoardServerError {
    /// Failed to bind to port.
    #[error("failed to bind to port {0}: {1}")]
    BindFailed(u16, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::application::services::BoardStatus;
    use crate::domain::session::StatusClass;

    fn connected_snapshot() -> BoardSnapshot {
        BoardSnapshot {
            board: BoardStatus {
                state: ConnectionState::Connected,
                message_count: 4,
                renderer: "incremental",
            },
            status: StatusLine::new(StatusClass::Connected, "connected, 4 messages"),
            ..BoardSnapshot::initial("incremental")
        }
    }

    fn state(
        snapshot: BoardSnapshot,
    ) -> (Arc<BoardServerState>, mpsc::Receiver<ControlCommand>) {
        let (_tx, rx) = watch::channel(snapshot);
        let (control_tx, control_rx) = mpsc::channel(1);
        let state = BoardServerState::new("0.1.0".to_string(), rx, control_tx);
        (Arc::new(state), control_rx)
    }

    async fn get(state: Arc<BoardServerState>, uri: &str) -> (StatusCode, String) {
        let response = router(state)
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn status_reports_session() {
        let (state, _control_rx) = state(connected_snapshot());
        let (code, body) = get(state, "/status").await;

        assert_eq!(code, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["state"], "connected");
        assert_eq!(json["connected"], true);
        assert_eq!(json["message_count"], 4);
        assert_eq!(json["status"]["class"], "connected");
        assert_eq!(json["status"]["text"], "connected, 4 messages");
    }

    #[tokio::test]
    async fn readiness_follows_connection() {
        let (ready, _rx) = state(connected_snapshot());
        assert_eq!(get(ready, "/readyz").await.0, StatusCode::OK);

        let (not_ready, _rx) = state(BoardSnapshot::initial("incremental"));
        assert_eq!(
            get(not_ready, "/readyz").await.0,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn board_is_html() {
        let (state, _rx) = state(connected_snapshot());
        let (code, body) = get(state, "/board").await;
        assert_eq!(code, StatusCode::OK);
        assert!(body.contains("connected, 4 messages"));
    }

    #[tokio::test]
    async fn reconnect_sends_command() {
        let (state, mut control_rx) = state(BoardSnapshot::initial("incremental"));
        let response = router(state)
            .oneshot(Request::post("/reconnect").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(control_rx.try_recv().unwrap(), ControlCommand::Reconnect);
    }

    #[tokio::test]
    async fn reconnect_after_session_stopped() {
        let (state, control_rx) = state(BoardSnapshot::initial("incremental"));
        drop(control_rx);
        let response = router(state)
            .oneshot(Request::post("/reconnect").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
