//! Configuration Module
//!
//! Configuration loading for the board client.

mod settings;

pub use settings::{BoardConfig, ConfigError, RendererKind, ServerSettings, TransformSettings};
