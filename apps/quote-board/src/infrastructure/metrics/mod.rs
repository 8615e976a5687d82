//! Prometheus Metrics Module
//!
//! Counters and timings for the feed session, rendered at `/metrics` on the
//! board HTTP server.
//!
//! # Metrics
//!
//! - **Messages**: received and dropped feed messages
//! - **Panels**: created and replaced instrument panels, current panel count
//! - **Transport**: connection lifecycle events
//! - **Render**: time spent per render pass, by strategy
//!
//! Recording before [`init_metrics`] is a no-op.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::application::ports::RenderReport;
use crate::infrastructure::feed::TransportEvent;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder.
///
/// Repeated calls return the handle installed first.
///
/// # Errors
///
/// Returns an error if another global recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

fn register_metrics() {
    describe_counter!(
        "quote_board_messages_received_total",
        "Feed messages received while connected"
    );
    describe_counter!(
        "quote_board_messages_dropped_total",
        "Feed messages that produced no render, by reason"
    );
    describe_counter!(
        "quote_board_snippets_skipped_total",
        "Instrument snippets skipped for a missing symbol"
    );
    describe_counter!(
        "quote_board_panels_total",
        "Instrument panels attached or replaced, by operation"
    );
    describe_gauge!("quote_board_panels", "Instrument panels on the board");
    describe_counter!(
        "quote_board_transport_events_total",
        "Transport lifecycle events, by event"
    );
    describe_histogram!(
        "quote_board_render_seconds",
        "Time to render one message, by renderer"
    );
}

/// Record a transport event.
pub fn record_transport_event(event: &TransportEvent) {
    counter!(
        "quote_board_transport_events_total",
        "event" => event.as_str()
    )
    .increment(1);
}

/// Record a message received while connected.
pub fn record_message_received() {
    counter!("quote_board_messages_received_total").increment(1);
}

/// Record a message that could not be rendered.
pub fn record_message_dropped(reason: &'static str) {
    counter!("quote_board_messages_dropped_total", "reason" => reason).increment(1);
}

/// Record the outcome and duration of one render pass.
pub fn record_render(renderer: &'static str, report: &RenderReport, elapsed: Duration) {
    if report.skipped > 0 {
        counter!("quote_board_snippets_skipped_total").increment(report.skipped as u64);
    }
    if report.created > 0 {
        counter!("quote_board_panels_total", "op" => "created").increment(report.created as u64);
    }
    if report.replaced > 0 {
        counter!("quote_board_panels_total", "op" => "replaced")
            .increment(report.replaced as u64);
    }
    histogram!("quote_board_render_seconds", "renderer" => renderer)
        .record(elapsed.as_secs_f64());
}

/// Update the panel count.
#[allow(clippy::cast_precision_loss)]
pub fn set_panels(count: usize) {
    gauge!("quote_board_panels").set(count as f64);
}
