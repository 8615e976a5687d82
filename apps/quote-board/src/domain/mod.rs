//! Domain Layer - Instrument model, views and the feed session.
//!
//! Everything here is synchronous and free of I/O. The feed transport,
//! the XML codec and the concrete display surface live in the
//! infrastructure layer.

/// Instrument snippets, quote/trade records and tick extraction.
pub mod instrument;

/// Instrument panels built from snippets.
pub mod view;

/// Symbol-keyed registry of attached panels.
pub mod registry;

/// Feed session state machine.
pub mod session;
