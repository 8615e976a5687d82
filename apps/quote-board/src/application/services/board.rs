//! Board Service
//!
//! Owns the feed session, the chosen renderer and the display surface, and
//! applies session effects in order. Each inbound message is decoded,
//! rendered and reflected in the status readout before the next transport
//! event is looked at.

use std::time::Instant;

use serde::Serialize;

use crate::application::ports::{DisplaySurface, Renderer};
use crate::domain::session::{ConnectionState, FeedSession, SessionEffect};
use crate::infrastructure::feed::{TransportEvent, XmlCodec};
use crate::infrastructure::metrics;

/// Session summary for status endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoardStatus {
    /// Connection state.
    pub state: ConnectionState,
    /// Messages since the transport last opened.
    pub message_count: u64,
    /// Active renderer.
    pub renderer: &'static str,
}

/// Session + renderer + surface.
pub struct BoardService<S> {
    session: FeedSession,
    renderer: Box<dyn Renderer>,
    surface: S,
    codec: XmlCodec,
}

impl<S: DisplaySurface> BoardService<S> {
    /// Create a service.
    #[must_use]
    pub fn new(session: FeedSession, renderer: Box<dyn Renderer>, surface: S) -> Self {
        Self {
            session,
            renderer,
            surface,
            codec: XmlCodec::new(),
        }
    }

    /// Ask the session for a connection.
    ///
    /// Returns `true` when the caller must open a transport connection.
    pub fn open(&mut self) -> bool {
        let effects = self.session.open();
        self.apply(effects)
    }

    /// Feed one transport event through the session.
    ///
    /// Returns `true` when the caller must open a transport connection.
    pub fn handle(&mut self, event: TransportEvent) -> bool {
        metrics::record_transport_event(&event);

        let effects = match event {
            TransportEvent::Opened => self.session.on_open(),
            TransportEvent::Message(text) => self.session.on_message(text),
            TransportEvent::Closed => self.session.on_close(),
            TransportEvent::Failed(reason) => {
                tracing::warn!(reason = %reason, "Feed transport failed");
                self.session.on_error(&reason)
            }
        };

        self.apply(effects)
    }

    fn apply(&mut self, effects: Vec<SessionEffect>) -> bool {
        let mut connect = false;
        for effect in effects {
            match effect {
                SessionEffect::Status(status) => self.surface.set_status(&status),
                SessionEffect::Connect => connect = true,
                SessionEffect::Dispatch(text) => self.dispatch(&text),
            }
        }
        connect
    }

    fn dispatch(&mut self, text: &str) {
        metrics::record_message_received();
        let started = Instant::now();

        let document = match self.codec.decode(text) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    message = self.session.message_count(),
                    "Dropping malformed feed message"
                );
                metrics::record_message_dropped("malformed");
                return;
            }
        };

        let report = self.renderer.render(&document, &mut self.surface);
        metrics::record_render(self.renderer.name(), &report, started.elapsed());

        tracing::debug!(
            message = self.session.message_count(),
            snippets = document.len(),
            created = report.created,
            replaced = report.replaced,
            skipped = report.skipped,
            "Feed message rendered"
        );
    }

    /// Session summary.
    #[must_use]
    pub fn status(&self) -> BoardStatus {
        BoardStatus {
            state: self.session.state(),
            message_count: self.session.message_count(),
            renderer: self.renderer.name(),
        }
    }

    /// The feed session.
    #[must_use]
    pub const fn session(&self) -> &FeedSession {
        &self.session
    }

    /// The display surface.
    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }
}
