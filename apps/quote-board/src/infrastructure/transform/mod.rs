//! Transform Renderer
//!
//! Alternative rendering path driven by an externally supplied artifact.
//! Each message is re-rendered into two fixed containers, one per quoting
//! side; no instrument panels or registry are involved.
//!
//! The artifact is loaded once at startup. If it can't be fetched or
//! compiled the renderer degrades to doing nothing, after a single warning.

mod source;
mod template;

pub use source::TransformSource;
pub use template::{CompiledTransform, SideSpec, TransformSpec};

use std::time::Duration;

use thiserror::Error;

use crate::application::ports::{DisplaySurface, RenderReport, Renderer};
use crate::domain::instrument::{FeedDocument, Side};
use crate::infrastructure::board::{ASK_CONTAINER, BID_CONTAINER};

/// Errors loading or compiling a transform artifact.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Reading a local artifact failed.
    #[error("failed to read transform: {0}")]
    Io(#[from] std::io::Error),

    /// Fetching a remote artifact failed.
    #[error("failed to fetch transform: {0}")]
    Http(#[from] reqwest::Error),

    /// The artifact is not valid JSON of the expected shape.
    #[error("invalid transform document: {0}")]
    Json(#[from] serde_json::Error),

    /// A row template names a field that doesn't exist.
    #[error("unknown placeholder {{{name}}} in {side} row")]
    UnknownPlaceholder {
        /// Side whose template is at fault.
        side: &'static str,
        /// The placeholder as written.
        name: String,
    },

    /// A `{` without a closing `}`.
    #[error("unclosed placeholder in {0} row")]
    UnclosedPlaceholder(&'static str),

    /// A lone `}` outside a placeholder.
    #[error("unmatched '}}' in {0} row")]
    UnmatchedBrace(&'static str),
}

/// Renders whole messages through a [`CompiledTransform`].
#[derive(Debug, Default)]
pub struct TransformRenderer {
    transform: Option<CompiledTransform>,
}

impl TransformRenderer {
    /// Create a renderer around an already compiled transform.
    #[must_use]
    pub const fn new(transform: Option<CompiledTransform>) -> Self {
        Self { transform }
    }

    /// Fetch and compile the artifact at `source`.
    ///
    /// Failure is logged once here and yields a renderer that renders
    /// nothing.
    pub async fn load(source: &TransformSource, timeout: Duration) -> Self {
        let compiled = match source.load(timeout).await {
            Ok(text) => CompiledTransform::compile(&text),
            Err(e) => Err(e),
        };

        match compiled {
            Ok(transform) => {
                tracing::info!(source = %source, "Transform loaded");
                Self::new(Some(transform))
            }
            Err(e) => {
                tracing::warn!(
                    source = %source,
                    error = %e,
                    "Transform unavailable, messages will not be rendered"
                );
                Self::new(None)
            }
        }
    }

    /// Whether an artifact is available.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.transform.is_some()
    }
}

impl Renderer for TransformRenderer {
    fn name(&self) -> &'static str {
        "transform"
    }

    fn render(
        &mut self,
        document: &FeedDocument,
        surface: &mut dyn DisplaySurface,
    ) -> RenderReport {
        let Some(transform) = &self.transform else {
            return RenderReport::default();
        };

        surface.replace_container(BID_CONTAINER, transform.apply(document, Side::Bid));
        surface.replace_container(ASK_CONTAINER, transform.apply(document, Side::Ask));

        RenderReport {
            containers: 2,
            ..RenderReport::default()
        }
    }
}
