//! View Registry
//!
//! Maps each symbol to the view currently attached to the display surface.
//! Entries are inserted or replaced, never removed: an instrument that stops
//! appearing in the feed keeps its last panel.

use std::collections::HashMap;
use std::sync::Arc;

use super::instrument::Symbol;
use super::view::InstrumentView;

/// Symbol to attached view.
#[derive(Debug, Default)]
pub struct ViewRegistry {
    views: HashMap<Symbol, Arc<InstrumentView>>,
}

impl ViewRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The view attached for `symbol`.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&Arc<InstrumentView>> {
        self.views.get(symbol)
    }

    /// Whether a view is attached for `symbol`.
    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.views.contains_key(symbol)
    }

    /// Record `view` as the attached view for its symbol.
    ///
    /// Returns the view it replaced, if any.
    pub fn insert(&mut self, view: Arc<InstrumentView>) -> Option<Arc<InstrumentView>> {
        self.views.insert(view.symbol().to_string(), view)
    }

    /// Number of symbols on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Registered symbols, sorted.
    #[must_use]
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.views.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }
}
