//! Configuration for trustlens-runtime.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not readable: {0}")]
    Io(#[from] std::io::Error),

    #[error("config YAML malformed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("min_review_length must be at least 1, got {0}")]
    InvalidMinLength(usize),
}

/// Runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Reviews with fewer trimmed characters are rejected before any
    /// analysis runs
    #[serde(default = "default_min_review_length")]
    pub min_review_length: usize,

    /// Summarization call configuration
    #[serde(default)]
    pub summarizer: SummarizerConfig,
}

fn default_min_review_length() -> usize {
    10
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            min_review_length: 10,
            summarizer: SummarizerConfig::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_review_length == 0 {
            return Err(ConfigError::InvalidMinLength(0));
        }
        Ok(())
    }
}

/// Summarization call configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Model identifier passed to the provider
    #[serde(default = "default_model")]
    pub model: String,

    /// Response token cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Low temperature keeps the analysis consistent run to run
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Provider call timeout
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,
}

fn default_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f64 {
    0.3
}

fn default_timeout() -> Duration {
    Duration::from_secs(15)
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: 1000,
            temperature: 0.3,
            timeout: Duration::from_secs(15),
        }
    }
}

// Custom serialization for Duration using humantime format
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();
        assert_eq!(config.min_review_length, 10);
        assert_eq!(config.summarizer.model, "claude-sonnet-4-5-20250929");
        assert_eq!(config.summarizer.max_tokens, 1000);
        assert_eq!(config.summarizer.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_yaml_with_humantime_timeout() {
        let config = RuntimeConfig::from_yaml(
            "min_review_length: 20\nsummarizer:\n  timeout: 30s\n  temperature: 0.1\n",
        )
        .unwrap();

        assert_eq!(config.min_review_length, 20);
        assert_eq!(config.summarizer.timeout, Duration::from_secs(30));
        assert_eq!(config.summarizer.temperature, 0.1);
        // Unspecified fields keep their defaults.
        assert_eq!(config.summarizer.max_tokens, 1000);
    }

    #[test]
    fn test_zero_min_length_rejected() {
        let err = RuntimeConfig::from_yaml("min_review_length: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMinLength(0)));
    }

    #[test]
    fn test_timeout_round_trips() {
        let config = RuntimeConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("15s"));

        let parsed = RuntimeConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.summarizer.timeout, config.summarizer.timeout);
    }
}
