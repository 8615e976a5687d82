//! Infrastructure Layer - Adapters and external integrations.
//!
//! Concrete implementations of the application ports plus the process
//! plumbing around them.

/// WebSocket transport, XML codec and the session runner.
pub mod feed;

/// In-memory display surface and its snapshots.
pub mod board;

/// Transform-driven fallback renderer.
pub mod transform;

/// Price-ladder renderer.
pub mod ladder;

/// Board, status and control HTTP endpoints.
pub mod http;

/// Configuration loading.
pub mod config;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Logging and OpenTelemetry tracing.
pub mod telemetry;
