//! Tick extraction: snippet relations to typed quote and trade records.

use std::slice;

use super::{InstrumentSnippet, RawTick};

/// Quoting side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Bid side (`quotes/b`).
    Bid,
    /// Ask side (`quotes/a`).
    Ask,
}

impl Side {
    /// Lowercase side name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bid => "bid",
            Self::Ask => "ask",
        }
    }
}

/// The three tick relations of an instrument snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// `quotes/b`
    Bids,
    /// `quotes/a`
    Asks,
    /// `trades/t`
    Trades,
}

impl Relation {
    /// All relations in panel order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Bids, Self::Asks, Self::Trades]
    }

    /// Relation name, also used as the panel list class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bids => "bids",
            Self::Asks => "asks",
            Self::Trades => "trades",
        }
    }
}

/// A bid or ask level as quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRecord {
    /// Quoting side.
    pub side: Side,
    /// Price, verbatim.
    pub price: String,
    /// Quantity, verbatim.
    pub quantity: String,
}

/// A recent trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRecord {
    /// Price, verbatim.
    pub price: String,
    /// Quantity, verbatim.
    pub quantity: String,
}

/// One extracted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickRecord {
    /// From `quotes/b` or `quotes/a`.
    Quote(QuoteRecord),
    /// From `trades/t`.
    Trade(TradeRecord),
}

impl TickRecord {
    /// Price field.
    #[must_use]
    pub fn price(&self) -> &str {
        match self {
            Self::Quote(q) => &q.price,
            Self::Trade(t) => &t.price,
        }
    }

    /// Quantity field.
    #[must_use]
    pub fn quantity(&self) -> &str {
        match self {
            Self::Quote(q) => &q.quantity,
            Self::Trade(t) => &t.quantity,
        }
    }

    /// Split into price and quantity.
    #[must_use]
    pub fn into_parts(self) -> (String, String) {
        match self {
            Self::Quote(q) => (q.price, q.quantity),
            Self::Trade(t) => (t.price, t.quantity),
        }
    }
}

/// Records of one relation, in document order.
///
/// Consumed once; ask [`extract`] again for a fresh pass.
#[derive(Debug)]
pub struct Ticks<'a> {
    relation: Relation,
    inner: slice::Iter<'a, RawTick>,
}

impl Iterator for Ticks<'_> {
    type Item = TickRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let raw = self.inner.next()?;
        let price = raw.price.clone().unwrap_or_default();
        let quantity = raw.quantity.clone().unwrap_or_default();

        Some(match self.relation {
            Relation::Bids => TickRecord::Quote(QuoteRecord {
                side: Side::Bid,
                price,
                quantity,
            }),
            Relation::Asks => TickRecord::Quote(QuoteRecord {
                side: Side::Ask,
                price,
                quantity,
            }),
            Relation::Trades => TickRecord::Trade(TradeRecord { price, quantity }),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Ticks<'_> {}

/// Extract the records of `relation` from a snippet.
///
/// A tick missing `p` or `q` yields an empty field; it never aborts the
/// rest of the extraction.
#[must_use]
pub fn extract(snippet: &InstrumentSnippet, relation: Relation) -> Ticks<'_> {
    Ticks {
        relation,
        inner: snippet.raw(relation).iter(),
    }
}
