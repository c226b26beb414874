//! Configuration model for Redraft.
//!
//! The file lives at `<config_dir>/config.toml`; every field has a default so
//! a missing file or a partial file is valid.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::diff::DEFAULT_WINDOW;

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct RootConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// Settings for the editing engine itself.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Upper bound for one generation round-trip.
    #[serde(default = "default_generation_timeout_ms")]
    pub generation_timeout_ms: u64,
    /// Forward search window of the diff engine, in tokens.
    #[serde(default = "default_diff_window")]
    pub diff_window: usize,
    /// Buffer size of the suggestion event broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl EngineConfig {
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_millis(self.generation_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            generation_timeout_ms: default_generation_timeout_ms(),
            diff_window: default_diff_window(),
            event_capacity: default_event_capacity(),
        }
    }
}

/// Settings for the text-generation collaborator.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Extra attempts after a retryable HTTP failure.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: default_max_tokens(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
        }
    }
}

fn default_generation_timeout_ms() -> u64 {
    30_000
}

fn default_diff_window() -> usize {
    DEFAULT_WINDOW
}

fn default_event_capacity() -> usize {
    64
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_max_retries() -> u32 {
    2
}

fn default_initial_backoff_ms() -> u64 {
    500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: RootConfig = toml::from_str("").unwrap();
        assert_eq!(config, RootConfig::default());
        assert_eq!(config.engine.generation_timeout(), Duration::from_secs(30));
        assert_eq!(config.engine.diff_window, 10);
    }

    #[test]
    fn test_partial_engine_section() {
        let config: RootConfig = toml::from_str(
            r#"
            [engine]
            generation_timeout_ms = 1500

            [generator]
            model = "claude-test"
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.generation_timeout_ms, 1500);
        assert_eq!(config.engine.event_capacity, 64);
        assert_eq!(config.generator.model.as_deref(), Some("claude-test"));
        assert_eq!(config.generator.max_retries, 2);
    }
}
