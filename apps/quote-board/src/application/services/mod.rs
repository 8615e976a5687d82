//! Application Services
//!
//! - `reconcile`: symbol-keyed reconciliation of documents into panels
//! - `board`: applies feed session effects and dispatches messages

pub mod board;
pub mod reconcile;

pub use board::{BoardService, BoardStatus};
pub use reconcile::{IncrementalRenderer, Reconciler};
