//! Feed Runner
//!
//! The single task that owns the [`BoardService`]. Transport events and
//! control commands are handled one at a time, so the render pass for one
//! message always finishes before the next message is looked at. After each
//! event the board is published on a watch channel.

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::client::{FeedClient, TransportEvent};
use crate::application::services::BoardService;
use crate::infrastructure::board::{BoardSnapshot, BoardSurface};
use crate::infrastructure::metrics;

/// Commands from outside the session task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Explicit reconnect request. A no-op while connecting or connected.
    Reconnect,
}

/// Runner configuration.
#[derive(Debug, Clone)]
pub struct FeedRunnerConfig {
    /// Feed endpoint.
    pub url: String,
    /// Capacity of the transport event channel.
    pub event_capacity: usize,
}

/// Drives one board from transport events.
pub struct FeedRunner {
    config: FeedRunnerConfig,
    service: BoardService<BoardSurface>,
    snapshot_tx: watch::Sender<BoardSnapshot>,
    cancel: CancellationToken,
}

impl FeedRunner {
    /// Create a runner.
    #[must_use]
    pub const fn new(
        config: FeedRunnerConfig,
        service: BoardService<BoardSurface>,
        snapshot_tx: watch::Sender<BoardSnapshot>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            service,
            snapshot_tx,
            cancel,
        }
    }

    /// Open the feed and process events until cancelled.
    ///
    /// Returns the service so callers can inspect the final board.
    pub async fn run(
        mut self,
        mut control_rx: mpsc::Receiver<ControlCommand>,
    ) -> BoardService<BoardSurface> {
        let (event_tx, mut event_rx) = mpsc::channel(self.config.event_capacity);

        if self.service.open() {
            self.spawn_connection(&event_tx);
        }
        self.publish();

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    tracing::info!("Feed runner cancelled");
                    break;
                }
                Some(command) = control_rx.recv() => {
                    match command {
                        ControlCommand::Reconnect => {
                            tracing::info!("Reconnect requested");
                            if self.service.open() {
                                self.spawn_connection(&event_tx);
                            }
                        }
                    }
                }
                Some(event) = event_rx.recv() => {
                    if self.service.handle(event) {
                        self.spawn_connection(&event_tx);
                    }
                }
            }
            self.publish();
        }

        self.service
    }

    fn spawn_connection(&self, event_tx: &mpsc::Sender<TransportEvent>) {
        let client = FeedClient::new(
            self.config.url.clone(),
            event_tx.clone(),
            self.cancel.child_token(),
        );
        tokio::spawn(async move {
            if let Err(e) = client.run().await {
                tracing::error!(error = %e, "Feed client error");
            }
        });
    }

    fn publish(&self) {
        let snapshot = self
            .service
            .surface()
            .snapshot(self.service.status());
        metrics::set_panels(snapshot.panels.len());
        self.snapshot_tx.send_replace(snapshot);
    }
}
