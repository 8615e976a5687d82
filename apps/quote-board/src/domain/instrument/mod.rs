//! Instrument Data Model
//!
//! Typed form of one feed message. A message document is walked once by the
//! codec into a [`FeedDocument`]; every component downstream works on these
//! types instead of re-querying the raw XML.
//!
//! Prices and quantities stay display strings. Nothing in this module parses
//! them as numbers.

mod ticks;

pub use ticks::{QuoteRecord, Relation, Side, TickRecord, Ticks, TradeRecord, extract};

/// A symbol string, the unique key of an instrument.
pub type Symbol = String;

/// One `<b>`, `<a>` or `<t>` node as it appeared in the document.
///
/// Attributes are optional; a tick without `p` or `q` is still a tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTick {
    /// Value of the `p` attribute.
    pub price: Option<String>,
    /// Value of the `q` attribute.
    pub quantity: Option<String>,
}

impl RawTick {
    /// Create a tick with both attributes present.
    #[must_use]
    pub fn new(price: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            price: Some(price.into()),
            quantity: Some(quantity.into()),
        }
    }
}

/// One `<instr>` occurrence inside a message document.
///
/// Snippets only live for the duration of one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstrumentSnippet {
    /// The `sym` attribute. Absent on malformed snippets.
    pub symbol: Option<Symbol>,
    /// The `descr` attribute.
    pub description: Option<String>,
    /// `quotes/b` children in document order.
    pub bids: Vec<RawTick>,
    /// `quotes/a` children in document order.
    pub asks: Vec<RawTick>,
    /// `trades/t` children in document order.
    pub trades: Vec<RawTick>,
}

impl InstrumentSnippet {
    /// Create an empty snippet for a symbol.
    #[must_use]
    pub fn new(symbol: impl Into<Symbol>, description: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            description: Some(description.into()),
            ..Self::default()
        }
    }

    /// The symbol, treating an empty attribute like a missing one.
    #[must_use]
    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref().filter(|s| !s.is_empty())
    }

    /// Raw tick nodes for a relation.
    #[must_use]
    pub fn raw(&self, relation: Relation) -> &[RawTick] {
        match relation {
            Relation::Bids => &self.bids,
            Relation::Asks => &self.asks,
            Relation::Trades => &self.trades,
        }
    }
}

/// A fully parsed message: every instrument snippet in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedDocument {
    /// Snippets found anywhere in the document.
    pub snippets: Vec<InstrumentSnippet>,
}

impl FeedDocument {
    /// Create a document from snippets.
    #[must_use]
    pub const fn new(snippets: Vec<InstrumentSnippet>) -> Self {
        Self { snippets }
    }

    /// Number of snippets in the document.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    /// Whether the document carries no snippets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }
}
