//! Instrument View Builder
//!
//! Turns one [`InstrumentSnippet`] into a detached [`InstrumentView`]: a
//! header and three ordered lists. Views are never patched. A newer message
//! builds a new view that replaces the attached one wholesale.

use std::fmt::Write as _;

use quick_xml::escape::escape;

use super::instrument::{InstrumentSnippet, Relation, Symbol, extract};

/// Why a snippet could not become a view.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnippetError {
    /// The snippet has no usable `sym` attribute.
    #[error("instrument snippet has no symbol")]
    MissingSymbol,
}

/// Panel header: symbol and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewHeader {
    /// Instrument symbol.
    pub symbol: Symbol,
    /// Display description, empty when the feed sent none.
    pub description: String,
}

/// One displayed tick: labelled price and quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickEntry {
    /// Price, verbatim from the feed.
    pub price: String,
    /// Quantity, verbatim from the feed.
    pub quantity: String,
}

/// Rendered state of one instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentView {
    /// Header block.
    pub header: ViewHeader,
    /// Bid list.
    pub bids: Vec<TickEntry>,
    /// Ask list.
    pub asks: Vec<TickEntry>,
    /// Trade list.
    pub trades: Vec<TickEntry>,
}

impl InstrumentView {
    /// Identity key of the panel.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.header.symbol
    }

    /// Entries of one relation.
    #[must_use]
    pub fn list(&self, relation: Relation) -> &[TickEntry] {
        match relation {
            Relation::Bids => &self.bids,
            Relation::Asks => &self.asks,
            Relation::Trades => &self.trades,
        }
    }

    /// Render the panel as an HTML fragment with id `instr-{symbol}`.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(256);
        let _ = write!(
            out,
            "<div class=\"instr\" id=\"instr-{sym}\"><span class=\"sym\">{sym}</span><span class=\"descr\">{descr}</span>",
            sym = escape(self.header.symbol.as_str()),
            descr = escape(self.header.description.as_str()),
        );
        for relation in Relation::all() {
            let _ = write!(out, "<div class=\"{}\">", relation.as_str());
            for entry in self.list(*relation) {
                let _ = write!(
                    out,
                    "<div class=\"tick\"><span class=\"p\">{}</span><span class=\"q\">{}</span></div>",
                    escape(entry.price.as_str()),
                    escape(entry.quantity.as_str()),
                );
            }
            out.push_str("</div>");
        }
        out.push_str("</div>");
        out
    }
}

/// Build a view from a snippet.
///
/// Pure: the same snippet always yields an equal view.
///
/// # Errors
///
/// Returns [`SnippetError::MissingSymbol`] when the snippet has no symbol.
pub fn build_view(snippet: &InstrumentSnippet) -> Result<InstrumentView, SnippetError> {
    let symbol = snippet.symbol().ok_or(SnippetError::MissingSymbol)?;

    let list = |relation| {
        extract(snippet, relation)
            .map(|tick| {
                let (price, quantity) = tick.into_parts();
                TickEntry { price, quantity }
            })
            .collect::<Vec<_>>()
    };

    Ok(InstrumentView {
        header: ViewHeader {
            symbol: symbol.to_string(),
            description: snippet.description.clone().unwrap_or_default(),
        },
        bids: list(Relation::Bids),
        asks: list(Relation::Asks),
        trades: list(Relation::Trades),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instrument::RawTick;

    fn aapl() -> InstrumentSnippet {
        InstrumentSnippet {
            bids: vec![RawTick::new("100", "10")],
            trades: vec![RawTick::new("99.5", "2"), RawTick::new("99.75", "1")],
            ..InstrumentSnippet::new("AAPL", "Apple")
        }
    }

    #[test]
    fn builds_header_and_lists() {
        let view = build_view(&aapl()).unwrap();

        assert_eq!(view.symbol(), "AAPL");
        assert_eq!(view.header.description, "Apple");
        assert_eq!(
            view.bids,
            vec![TickEntry {
                price: "100".to_string(),
                quantity: "10".to_string()
            }]
        );
        assert!(view.asks.is_empty());
        assert_eq!(view.trades.len(), 2);
        assert_eq!(view.trades[1].price, "99.75");
    }

    #[test]
    fn build_is_pure() {
        assert_eq!(build_view(&aapl()), build_view(&aapl()));
    }

    #[test]
    fn missing_symbol_is_an_error() {
        let snippet = InstrumentSnippet {
            symbol: None,
            description: Some("no symbol here".to_string()),
            ..InstrumentSnippet::default()
        };
        assert_eq!(build_view(&snippet), Err(SnippetError::MissingSymbol));
    }

    #[test]
    fn missing_description_is_empty() {
        let snippet = InstrumentSnippet {
            symbol: Some("Y".to_string()),
            ..InstrumentSnippet::default()
        };
        assert_eq!(build_view(&snippet).unwrap().header.description, "");
    }

    #[test]
    fn html_escapes_text() {
        let snippet = InstrumentSnippet {
            asks: vec![RawTick::new("1<2", "3&4")],
            ..InstrumentSnippet::new("A&B", "\"quoted\"")
        };
        let html = build_view(&snippet).unwrap().to_html();

        assert!(html.contains("id=\"instr-A&amp;B\""));
        assert!(html.contains("&quot;quoted&quot;"));
        assert!(html.contains("<span class=\"p\">1&lt;2</span>"));
        assert!(html.contains("<span class=\"q\">3&amp;4</span>"));
        assert!(html.contains("<div class=\"bids\"></div>"));
    }
}
