//! Application Layer - Use cases and port definitions.
//!
//! This layer wires the domain together: it reconciles documents into a
//! display surface and applies feed session effects.

/// Port interfaces for the display surface and renderers.
pub mod ports;

/// Reconciliation and board orchestration.
pub mod services;
