//! Board Configuration Settings
//!
//! Configuration types for the board client, loaded from environment
//! variables.

use std::time::Duration;

use crate::infrastructure::transform::TransformSource;

/// Rendering strategy selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RendererKind {
    /// Per-symbol panels replaced on every update.
    #[default]
    Incremental,
    /// Whole-message transform into the bid and ask containers.
    Transform,
    /// Price-keyed ladders rebuilt per message.
    Ladder,
}

impl RendererKind {
    /// Parse renderer kind from string.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "transform" => Self::Transform,
            "ladder" => Self::Ladder,
            _ => Self::Incremental,
        }
    }

    /// Get the renderer name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Incremental => "incremental",
            Self::Transform => "transform",
            Self::Ladder => "ladder",
        }
    }
}

/// Transform artifact settings.
#[derive(Debug, Clone)]
pub struct TransformSettings {
    /// Where the artifact is loaded from.
    pub source: TransformSource,
    /// Fetch timeout for remote artifacts.
    pub timeout: Duration,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            source: TransformSource::parse("quote-board.transform.json"),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Server settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Board and health HTTP port.
    pub http_port: u16,
    /// Capacity of the transport event channel.
    pub event_capacity: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            http_port: 8083,
            event_capacity: 1024,
        }
    }
}

/// Complete board configuration.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Feed endpoint.
    pub feed_url: String,
    /// Rendering strategy.
    pub renderer: RendererKind,
    /// Transform artifact settings.
    pub transform: TransformSettings,
    /// Server settings.
    pub server: ServerSettings,
}

impl BoardConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed URL is missing or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed URL is missing or empty.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let feed_url = lookup("QUOTE_BOARD_FEED_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("QUOTE_BOARD_FEED_URL".to_string()))?;

        if feed_url.trim().is_empty() {
            return Err(ConfigError::EmptyValue("QUOTE_BOARD_FEED_URL".to_string()));
        }

        let renderer = lookup("QUOTE_BOARD_RENDERER")
            .map(|s| RendererKind::from_str_case_insensitive(&s))
            .unwrap_or_default();

        let transform = TransformSettings {
            source: lookup("QUOTE_BOARD_TRANSFORM_SOURCE")
                .filter(|s| !s.trim().is_empty())
                .map_or_else(
                    || TransformSettings::default().source,
                    |s| TransformSource::parse(&s),
                ),
            timeout: parse_duration_secs(
                &lookup,
                "QUOTE_BOARD_TRANSFORM_TIMEOUT_SECS",
                TransformSettings::default().timeout,
            ),
        };

        let server = ServerSettings {
            http_port: parse_or(
                &lookup,
                "QUOTE_BOARD_HTTP_PORT",
                ServerSettings::default().http_port,
            ),
            event_capacity: parse_or(
                &lookup,
                "QUOTE_BOARD_EVENT_CAPACITY",
                ServerSettings::default().event_capacity,
            )
            .max(1),
        };

        Ok(Self {
            feed_url: feed_url.trim().to_string(),
            renderer,
            transform,
            server,
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_duration_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> Duration {
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use test_case::test_case;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<BoardConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        BoardConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test_case("incremental", RendererKind::Incremental)]
    #[test_case("TRANSFORM", RendererKind::Transform)]
    #[test_case("Ladder", RendererKind::Ladder)]
    #[test_case("unknown", RendererKind::Incremental)]
    fn renderer_kind_parsing(input: &str, expected: RendererKind) {
        assert_eq!(RendererKind::from_str_case_insensitive(input), expected);
    }

    #[test]
    fn defaults_apply() {
        let config = config(&[("QUOTE_BOARD_FEED_URL", "ws://localhost:7681/")]).unwrap();
        assert_eq!(config.feed_url, "ws://localhost:7681/");
        assert_eq!(config.renderer, RendererKind::Incremental);
        assert_eq!(config.server.http_port, 8083);
        assert_eq!(config.server.event_capacity, 1024);
        assert_eq!(config.transform.timeout, Duration::from_secs(10));
        assert_eq!(
            config.transform.source,
            TransformSource::File("quote-board.transform.json".into())
        );
    }

    #[test]
    fn overrides_apply() {
        let config = config(&[
            ("QUOTE_BOARD_FEED_URL", "wss://feed.example/quotes"),
            ("QUOTE_BOARD_RENDERER", "transform"),
            ("QUOTE_BOARD_TRANSFORM_SOURCE", "https://cdn.example/t.json"),
            ("QUOTE_BOARD_TRANSFORM_TIMEOUT_SECS", "3"),
            ("QUOTE_BOARD_HTTP_PORT", "9000"),
            ("QUOTE_BOARD_EVENT_CAPACITY", "16"),
        ])
        .unwrap();
        assert_eq!(config.renderer, RendererKind::Transform);
        assert_eq!(
            config.transform.source,
            TransformSource::Http("https://cdn.example/t.json".to_string())
        );
        assert_eq!(config.transform.timeout, Duration::from_secs(3));
        assert_eq!(config.server.http_port, 9000);
        assert_eq!(config.server.event_capacity, 16);
    }

    #[test]
    fn unparseable_numbers_fall_back() {
        let config = config(&[
            ("QUOTE_BOARD_FEED_URL", "ws://x/"),
            ("QUOTE_BOARD_HTTP_PORT", "http"),
            ("QUOTE_BOARD_EVENT_CAPACITY", "0"),
        ])
        .unwrap();
        assert_eq!(config.server.http_port, 8083);
        assert_eq!(config.server.event_capacity, 1);
    }

    #[test]
    fn missing_feed_url() {
        assert!(matches!(config(&[]), Err(ConfigError::MissingEnvVar(_))));
    }

    #[test]
    fn empty_feed_url() {
        assert!(matches!(
            config(&[("QUOTE_BOARD_FEED_URL", "  ")]),
            Err(ConfigError::EmptyValue(_))
        ));
    }
}
