//! In-Memory Board Surface
//!
//! The display surface the session renders into: an ordered list of
//! instrument panels keyed by symbol, a set of fixed containers for the
//! whole-fragment renderers, and the status readout. After every handled
//! event the runner publishes a [`BoardSnapshot`] for the HTTP server.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use quick_xml::escape::escape;

use crate::application::ports::DisplaySurface;
use crate::application::services::BoardStatus;
use crate::domain::session::{ConnectionState, StatusLine};
use crate::domain::view::InstrumentView;

/// Container holding the rendered bid side.
pub const BID_CONTAINER: &str = "bids";

/// Container holding the rendered ask side.
pub const ASK_CONTAINER: &str = "asks";

/// A fixed container and its current fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Container id.
    pub id: String,
    /// Current content.
    pub fragment: String,
}

/// Panels, containers and status.
#[derive(Debug, Default)]
pub struct BoardSurface {
    panels: Vec<Arc<InstrumentView>>,
    containers: Vec<Container>,
    status: StatusLine,
}

impl BoardSurface {
    /// Create an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attached panels in display order.
    #[must_use]
    pub fn panels(&self) -> &[Arc<InstrumentView>] {
        &self.panels
    }

    /// Number of attached panels.
    #[must_use]
    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    /// Number of panels attached for `symbol`.
    #[must_use]
    pub fn panels_for(&self, symbol: &str) -> usize {
        self.panels.iter().filter(|p| p.symbol() == symbol).count()
    }

    /// The panel attached for `symbol`.
    #[must_use]
    pub fn panel(&self, symbol: &str) -> Option<&Arc<InstrumentView>> {
        self.panels.iter().find(|p| p.symbol() == symbol)
    }

    /// Content of a fixed container.
    #[must_use]
    pub fn container(&self, id: &str) -> Option<&str> {
        self.containers
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.fragment.as_str())
    }

    /// Current status readout.
    #[must_use]
    pub const fn status(&self) -> &StatusLine {
        &self.status
    }

    /// Capture the board for readers outside the session task.
    #[must_use]
    pub fn snapshot(&self, board: BoardStatus) -> BoardSnapshot {
        BoardSnapshot {
            board,
            status: self.status.clone(),
            panels: self.panels.clone(),
            containers: self.containers.clone(),
            taken_at: Utc::now(),
        }
    }
}

impl DisplaySurface for BoardSurface {
    fn append_panel(&mut self, view: Arc<InstrumentView>) {
        self.panels.push(view);
    }

    fn replace_panel(&mut self, view: Arc<InstrumentView>) -> bool {
        match self.panels.iter_mut().find(|p| p.symbol() == view.symbol()) {
            Some(slot) => {
                *slot = view;
                true
            }
            None => false,
        }
    }

    fn replace_container(&mut self, container: &str, fragment: String) {
        match self.containers.iter_mut().find(|c| c.id == container) {
            Some(slot) => slot.fragment = fragment,
            None => self.containers.push(Container {
                id: container.to_string(),
                fragment,
            }),
        }
    }

    fn set_status(&mut self, status: &StatusLine) {
        self.status.clone_from(status);
    }
}

/// Read-only copy of the board at one point in time.
#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    /// Session summary.
    pub board: BoardStatus,
    /// Status readout.
    pub status: StatusLine,
    /// Panels in display order.
    pub panels: Vec<Arc<InstrumentView>>,
    /// Fixed containers.
    pub containers: Vec<Container>,
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
}

impl BoardSnapshot {
    /// Snapshot of a board that has not started yet.
    #[must_use]
    pub fn initial(renderer: &'static str) -> Self {
        Self {
            board: BoardStatus {
                state: ConnectionState::Disconnected,
                message_count: 0,
                renderer,
            },
            status: StatusLine::default(),
            panels: Vec::new(),
            containers: Vec::new(),
            taken_at: Utc::now(),
        }
    }

    /// Render the whole board as an HTML page.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(1024);
        out.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>quote board</title></head><body>");
        let _ = write!(
            out,
            "<div id=\"status\" class=\"{}\">{}</div><div id=\"board\">",
            self.status.class.as_str(),
            escape(self.status.text.as_str()),
        );
        for panel in &self.panels {
            out.push_str(&panel.to_html());
        }
        out.push_str("</div>");
        for container in &self.containers {
            // Container fragments are renderer output and already markup.
            let _ = write!(
                out,
                "<div id=\"{}\">{}</div>",
                escape(container.id.as_str()),
                container.fragment
            );
        }
        out.push_str("</body></html>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instrument::{InstrumentSnippet, RawTick};
    use crate::domain::session::StatusClass;
    use crate::domain::view::build_view;

    fn view(symbol: &str, bid: &str) -> Arc<InstrumentView> {
        let snippet = InstrumentSnippet {
            bids: vec![RawTick::new(bid, "1")],
            ..InstrumentSnippet::new(symbol, "")
        };
        Arc::new(build_view(&snippet).unwrap())
    }

    #[test]
    fn replace_keeps_position() {
        let mut board = BoardSurface::new();
        board.append_panel(view("A", "1"));
        board.append_panel(view("B", "1"));
        board.append_panel(view("C", "1"));

        assert!(board.replace_panel(view("B", "2")));
        let order: Vec<&str> = board.panels().iter().map(|p| p.symbol()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
        assert_eq!(board.panel("B").unwrap().bids[0].price, "2");
        assert_eq!(board.panels_for("B"), 1);
    }

    #[test]
    fn replace_unknown_panel_reports_false() {
        let mut board = BoardSurface::new();
        assert!(!board.replace_panel(view("A", "1")));
        assert_eq!(board.panel_count(), 0);
    }

    #[test]
    fn containers_are_overwritten() {
        let mut board = BoardSurface::new();
        board.replace_container(BID_CONTAINER, "<p>1</p>".to_string());
        board.replace_container(BID_CONTAINER, "<p>2</p>".to_string());
        assert_eq!(board.container("bids"), Some("<p>2</p>"));
        assert_eq!(board.container("asks"), None);
    }

    #[test]
    fn snapshot_renders_status_and_panels() {
        let mut board = BoardSurface::new();
        board.set_status(&StatusLine::new(StatusClass::Processing, "incoming message 3"));
        board.append_panel(view("AAPL", "100"));

        let html = board.snapshot(BoardSnapshot::initial("incremental").board).to_html();
        assert!(html.contains("<div id=\"status\" class=\"processing\">incoming message 3</div>"));
        assert!(html.contains("id=\"instr-AAPL\""));
    }

    #[test]
    fn panel_ids_never_collide_with_fixed_ids() {
        let mut board = BoardSurface::new();
        for symbol in ["status", "board", BID_CONTAINER, ASK_CONTAINER] {
            board.append_panel(view(symbol, "1"));
        }
        board.replace_container(BID_CONTAINER, String::new());
        board.replace_container(ASK_CONTAINER, String::new());

        let html = board.snapshot(BoardSnapshot::initial("ladder").board).to_html();
        for id in ["status", "board", BID_CONTAINER, ASK_CONTAINER] {
            assert_eq!(html.matches(&format!("id=\"{id}\"")).count(), 1, "{id}");
        }
    }
}
