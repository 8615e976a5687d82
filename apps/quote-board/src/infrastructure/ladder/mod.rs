//! Price Ladder Renderer
//!
//! Folds every snippet of a message into two price-keyed ladders, one per
//! quoting side, and rebuilds the `bids` and `asks` containers from them.
//! Symbol identity plays no part: the same price quoted by two instruments
//! collapses into one row.

use std::collections::HashMap;
use std::fmt::Write as _;

use quick_xml::escape::escape;

use crate::application::ports::{DisplaySurface, RenderReport, Renderer};
use crate::domain::instrument::{FeedDocument, Relation, extract};
use crate::infrastructure::board::{ASK_CONTAINER, BID_CONTAINER};

/// Price to quantity, in first-seen price order.
#[derive(Debug, Default)]
struct Ladder {
    index: HashMap<String, usize>,
    levels: Vec<(String, String)>,
}

impl Ladder {
    fn clear(&mut self) {
        self.index.clear();
        self.levels.clear();
    }

    /// Last quantity seen for a price wins.
    fn set(&mut self, price: String, quantity: String) {
        match self.index.get(&price) {
            Some(&i) => self.levels[i].1 = quantity,
            None => {
                self.index.insert(price.clone(), self.levels.len());
                self.levels.push((price, quantity));
            }
        }
    }

    fn to_html(&self) -> String {
        let mut out = String::new();
        for (price, quantity) in &self.levels {
            let _ = write!(out, "<p>{} {}</p>", escape(price), escape(quantity));
        }
        out
    }
}

/// Rebuilds two price ladders from scratch on every message.
#[derive(Debug, Default)]
pub struct LadderRenderer {
    bids: Ladder,
    asks: Ladder,
}

impl LadderRenderer {
    /// Create a renderer with empty ladders.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for LadderRenderer {
    fn name(&self) -> &'static str {
        "ladder"
    }

    fn render(
        &mut self,
        document: &FeedDocument,
        surface: &mut dyn DisplaySurface,
    ) -> RenderReport {
        self.bids.clear();
        self.asks.clear();

        for snippet in &document.snippets {
            for tick in extract(snippet, Relation::Bids) {
                let (price, quantity) = tick.into_parts();
                self.bids.set(price, quantity);
            }
            for tick in extract(snippet, Relation::Asks) {
                let (price, quantity) = tick.into_parts();
                self.asks.set(price, quantity);
            }
        }

        tracing::trace!(
            bids = self.bids.levels.len(),
            asks = self.asks.levels.len(),
            "Ladders rebuilt"
        );

        surface.replace_container(BID_CONTAINER, self.bids.to_html());
        surface.replace_container(ASK_CONTAINER, self.asks.to_html());

        RenderReport {
            containers: 2,
            ..RenderReport::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instrument::{InstrumentSnippet, RawTick};
    use crate::infrastructure::board::BoardSurface;

    fn snippet(symbol: &str, bids: &[(&str, &str)], asks: &[(&str, &str)]) -> InstrumentSnippet {
        InstrumentSnippet {
            bids: bids.iter().map(|(p, q)| RawTick::new(*p, *q)).collect(),
            asks: asks.iter().map(|(p, q)| RawTick::new(*p, *q)).collect(),
            ..InstrumentSnippet::new(symbol, "")
        }
    }

    #[test]
    fn last_quantity_wins_and_order_is_first_seen() {
        let doc = FeedDocument::new(vec![
            snippet("A", &[("100", "1"), ("99", "2")], &[("101", "5")]),
            snippet("B", &[("98", "4"), ("100", "7")], &[]),
        ]);
        let mut renderer = LadderRenderer::new();
        let mut board = BoardSurface::new();

        let report = renderer.render(&doc, &mut board);

        assert_eq!(report.containers, 2);
        assert_eq!(
            board.container(BID_CONTAINER),
            Some("<p>100 7</p><p>99 2</p><p>98 4</p>")
        );
        assert_eq!(board.container(ASK_CONTAINER), Some("<p>101 5</p>"));
        assert_eq!(board.panel_count(), 0);
    }

    #[test]
    fn ladders_are_cleared_between_messages() {
        let mut renderer = LadderRenderer::new();
        let mut board = BoardSurface::new();

        renderer.render(
            &FeedDocument::new(vec![snippet("A", &[("100", "1")], &[("101", "1")])]),
            &mut board,
        );
        renderer.render(
            &FeedDocument::new(vec![snippet("A", &[("90", "3")], &[])]),
            &mut board,
        );

        assert_eq!(board.container(BID_CONTAINER), Some("<p>90 3</p>"));
        assert_eq!(board.container(ASK_CONTAINER), Some(""));
    }

    #[test]
    fn missing_attributes_render_empty() {
        let doc = FeedDocument::new(vec![InstrumentSnippet {
            bids: vec![RawTick::default()],
            ..InstrumentSnippet::new("A", "")
        }]);
        let mut board = BoardSurface::new();
        LadderRenderer::new().render(&doc, &mut board);
        assert_eq!(board.container(BID_CONTAINER), Some("<p> </p>"));
    }
}
