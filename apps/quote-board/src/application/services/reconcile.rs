//! Reconciler
//!
//! Walks every instrument snippet of a document and, per symbol, either
//! attaches a new panel or replaces the attached one wholesale. Snippets are
//! applied in document order, so when a symbol occurs twice the later
//! occurrence is what stays on the board.

use std::sync::Arc;

use crate::application::ports::{DisplaySurface, RenderReport, Renderer};
use crate::domain::instrument::FeedDocument;
use crate::domain::registry::ViewRegistry;
use crate::domain::view::build_view;

/// Stateless document-to-board transform.
#[derive(Debug, Default, Clone, Copy)]
pub struct Reconciler;

impl Reconciler {
    /// Create a reconciler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Apply `document` to `registry` and `surface`.
    ///
    /// A snippet that cannot be built is logged and skipped; its siblings are
    /// still processed.
    pub fn reconcile(
        &self,
        document: &FeedDocument,
        registry: &mut ViewRegistry,
        surface: &mut dyn DisplaySurface,
    ) -> RenderReport {
        let mut report = RenderReport::default();

        for (index, snippet) in document.snippets.iter().enumerate() {
            let view = match build_view(snippet) {
                Ok(view) => Arc::new(view),
                Err(e) => {
                    tracing::warn!(
                        index,
                        description = snippet.description.as_deref().unwrap_or_default(),
                        error = %e,
                        "Skipping instrument snippet"
                    );
                    report.skipped += 1;
                    continue;
                }
            };

            if registry.contains(view.symbol()) {
                if !surface.replace_panel(Arc::clone(&view)) {
                    tracing::warn!(
                        symbol = view.symbol(),
                        "Registered panel missing from surface, attaching again"
                    );
                    surface.append_panel(Arc::clone(&view));
                }
                report.replaced += 1;
            } else {
                surface.append_panel(Arc::clone(&view));
                report.created += 1;
            }

            registry.insert(view);
        }

        report
    }
}

/// The primary renderer: [`Reconciler`] plus the registry it maintains.
#[derive(Debug, Default)]
pub struct IncrementalRenderer {
    reconciler: Reconciler,
    registry: ViewRegistry,
}

impl IncrementalRenderer {
    /// Create a renderer with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry of attached views.
    #[must_use]
    pub const fn registry(&self) -> &ViewRegistry {
        &self.registry
    }
}

impl Renderer for IncrementalRenderer {
    fn name(&self) -> &'static str {
        "incremental"
    }

    fn render(
        &mut self,
        document: &FeedDocument,
        surface: &mut dyn DisplaySurface,
    ) -> RenderReport {
        self.reconciler
            .reconcile(document, &mut self.registry, surface)
    }
}
