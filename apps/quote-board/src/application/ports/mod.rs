//! Port Interfaces
//!
//! ## Driven Ports (Outbound)
//!
//! - `DisplaySurface`: where panels, containers and status text end up
//!
//! ## Strategy Ports
//!
//! - `Renderer`: turns one parsed document into surface mutations. The
//!   symbol-keyed reconciler is the primary implementation; the transform
//!   and price-ladder renderers are alternates behind the same seam.

use std::sync::Arc;

use crate::domain::instrument::FeedDocument;
use crate::domain::session::StatusLine;
use crate::domain::view::InstrumentView;

/// The board the session renders into.
#[cfg_attr(test, mockall::automock)]
pub trait DisplaySurface {
    /// Attach a new panel at the end of the root container.
    fn append_panel(&mut self, view: Arc<InstrumentView>);

    /// Swap the attached panel with the same symbol for `view`, keeping its
    /// position. Returns `false` when no such panel is attached.
    fn replace_panel(&mut self, view: Arc<InstrumentView>) -> bool;

    /// Replace the whole content of a fixed container.
    fn replace_container(&mut self, container: &str, fragment: String);

    /// Update the status readout.
    fn set_status(&mut self, status: &StatusLine);
}

/// What one render pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Panels attached for previously unseen symbols.
    pub created: usize,
    /// Panels replaced in place.
    pub replaced: usize,
    /// Snippets skipped as malformed.
    pub skipped: usize,
    /// Fixed containers rewritten.
    pub containers: usize,
}

impl RenderReport {
    /// Whether the pass left the surface untouched.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.created == 0 && self.replaced == 0 && self.containers == 0
    }
}

/// A reconciliation strategy.
pub trait Renderer: Send {
    /// Short name used in logs and metric labels.
    fn name(&self) -> &'static str;

    /// Apply one parsed document to the surface.
    fn render(&mut self, document: &FeedDocument, surface: &mut dyn DisplaySurface)
    -> RenderReport;
}
