#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Quote Board - Streaming Instrument Board
//!
//! Holds one WebSocket connection to an XML quote feed and keeps a board of
//! per-instrument panels current. Every message is a batch of instrument
//! snapshots; each snapshot replaces the panel for its symbol, or adds a
//! new panel the first time a symbol is seen.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Feed data model and pure session logic
//!   - `instrument`: Snippets, ticks and tick extraction
//!   - `view`: Immutable instrument views and their HTML form
//!   - `registry`: Symbol → current view
//!   - `session`: Connection state machine and status readout
//!
//! - **Application**: Ports and use cases
//!   - `ports`: Display surface and renderer seams
//!   - `services`: Reconciliation and session effect application
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `feed`: WebSocket client, XML codec, session runner
//!   - `board`: In-memory display surface
//!   - `transform` / `ladder`: Alternative renderers
//!   - `http`: Board, status and health endpoints
//!   - `config`, `metrics`, `telemetry`: Process plumbing
//!
//! # Data Flow
//!
//! ```text
//!                 ┌────────────┐   ┌─────────────┐   ┌──────────────┐
//! Feed WS ──────► │ FeedClient │──►│ FeedRunner  │──►│ BoardSurface │
//!                 └────────────┘   │ (session +  │   └──────┬───────┘
//!                                  │  renderer)  │          │ watch
//! POST /reconnect ────────────────►└─────────────┘          ▼
//!                                                    ┌──────────────┐
//!                                                    │ BoardServer  │──► /board, /status
//!                                                    └──────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Domain layer - Feed data model and session logic.
pub mod domain;

/// Application layer - Ports and use cases.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// Domain types
pub use domain::instrument::{FeedDocument, InstrumentSnippet, RawTick, Relation, Side, Symbol};
pub use domain::registry::ViewRegistry;
pub use domain::session::{ConnectionState, FeedSession, SessionEffect, StatusClass, StatusLine};
pub use domain::view::{InstrumentView, SnippetError, build_view};

// Ports and services
pub use application::ports::{DisplaySurface, RenderReport, Renderer};
pub use application::services::{BoardService, BoardStatus, IncrementalRenderer, Reconciler};

// Adapters
pub use infrastructure::board::{BoardSnapshot, BoardSurface};
pub use infrastructure::config::{BoardConfig, ConfigError, RendererKind};
pub use infrastructure::feed::{
    CodecError, ControlCommand, FeedClient, FeedRunner, FeedRunnerConfig, TransportEvent,
    XmlCodec, transport_supported,
};
pub use infrastructure::http::{BoardServer, BoardServerError, BoardServerState};
pub use infrastructure::ladder::LadderRenderer;
pub use infrastructure::transform::{
    CompiledTransform, TransformError, TransformRenderer, TransformSource,
};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
