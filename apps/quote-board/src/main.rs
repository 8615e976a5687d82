//! Quote Board Binary
//!
//! Connects to the quote feed and serves the live board.
//!
//! # Usage
//!
//! ```bash
//! QUOTE_BOARD_FEED_URL=ws://localhost:7681/ cargo run --bin quote-board
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `QUOTE_BOARD_FEED_URL`: Feed WebSocket endpoint
//!
//! ## Optional
//! - `QUOTE_BOARD_RENDERER`: incremental | transform | ladder (default: incremental)
//! - `QUOTE_BOARD_TRANSFORM_SOURCE`: Transform file path or URL (default: quote-board.transform.json)
//! - `QUOTE_BOARD_TRANSFORM_TIMEOUT_SECS`: Transform fetch timeout (default: 10)
//! - `QUOTE_BOARD_HTTP_PORT`: Board HTTP port (default: 8083)
//! - `QUOTE_BOARD_EVENT_CAPACITY`: Transport event channel capacity (default: 1024)
//! - `OTEL_ENABLED`: Export spans over OTLP (default: false)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4317>)
//! - `OTEL_SERVICE_NAME`: Service name (default: quote-board)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use quote_board::infrastructure::telemetry;
use quote_board::{
    BoardConfig, BoardServer, BoardServerState, BoardService, BoardSnapshot, BoardSurface,
    FeedRunner, FeedRunnerConfig, FeedSession, IncrementalRenderer, LadderRenderer, Renderer,
    RendererKind, TransformRenderer, init_metrics, transport_supported,
};
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Pending reconnect requests beyond this are refused.
const CONTROL_CAPACITY: usize = 8;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        return Err("failed to install rustls crypto provider".into());
    }

    load_dotenv();

    let _telemetry_guard = telemetry::init();

    tracing::info!("Starting Quote Board");

    let _metrics_handle = init_metrics()?;

    let config = BoardConfig::from_env()?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    // The transform must be in place before the first message can arrive.
    let renderer: Box<dyn Renderer> = match config.renderer {
        RendererKind::Incremental => Box::new(IncrementalRenderer::new()),
        RendererKind::Ladder => Box::new(LadderRenderer::new()),
        RendererKind::Transform => Box::new(
            TransformRenderer::load(&config.transform.source, config.transform.timeout).await,
        ),
    };

    let supported = transport_supported(&config.feed_url);
    if !supported {
        tracing::warn!(url = %config.feed_url, "Feed endpoint is not a WebSocket URL");
    }

    let service = BoardService::new(
        FeedSession::new(supported),
        renderer,
        BoardSurface::new(),
    );

    let (snapshot_tx, snapshot_rx) =
        watch::channel(BoardSnapshot::initial(config.renderer.as_str()));
    let (control_tx, control_rx) = mpsc::channel(CONTROL_CAPACITY);

    let server_state = Arc::new(BoardServerState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        snapshot_rx,
        control_tx,
    ));
    let board_server = BoardServer::new(
        config.server.http_port,
        server_state,
        shutdown_token.clone(),
    );

    tokio::spawn(async move {
        if let Err(e) = board_server.run().await {
            tracing::error!(error = %e, "Board server error");
        }
    });

    let runner = FeedRunner::new(
        FeedRunnerConfig {
            url: config.feed_url.clone(),
            event_capacity: config.server.event_capacity,
        },
        service,
        snapshot_tx,
        shutdown_token.clone(),
    );
    let runner_handle = tokio::spawn(runner.run(control_rx));

    tracing::info!("Quote board ready");

    await_shutdown(shutdown_token).await;

    match runner_handle.await {
        Ok(service) => tracing::info!(
            messages = service.status().message_count,
            panels = service.surface().panel_count(),
            "Quote board stopped"
        ),
        Err(e) => tracing::error!(error = %e, "Feed runner panicked"),
    }
    Ok(())
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Log the parsed configuration.
fn log_config(config: &BoardConfig) {
    tracing::info!(
        feed_url = %config.feed_url,
        renderer = config.renderer.as_str(),
        http_port = config.server.http_port,
        event_capacity = config.server.event_capacity,
        "Configuration loaded"
    );
    if config.renderer == RendererKind::Transform {
        tracing::debug!(
            source = %config.transform.source,
            timeout_secs = config.transform.timeout.as_secs(),
            "Transform settings"
        );
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
}
