//! Accumulator configuration.
//!
//! Controls which built-in sources a context registers and the demo
//! binary's output. Thresholds are per-extraction-cycle byte minimums;
//! a zero threshold would let a dead source go unnoticed, so validation
//! rejects it up front.

use crate::accumulator::{EntropyAccumulator, EntropyError, BLOCK_SIZE};
use crate::source::{JitterSource, OsSource, Strength};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the built-in sources of an accumulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccumulatorConfig {
    /// Register the OS CSPRNG as a strong source.
    pub register_os: bool,
    /// Per-cycle byte threshold for the OS source.
    pub os_threshold: usize,
    /// Register the timing-jitter source as a weak source.
    pub register_jitter: bool,
    /// Per-cycle byte threshold for the jitter source.
    pub jitter_threshold: usize,
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        Self {
            register_os: true,
            os_threshold: 32,
            register_jitter: true,
            jitter_threshold: 4,
        }
    }
}

impl AccumulatorConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.register_os && self.os_threshold == 0 {
            return Err(ConfigError::ZeroThreshold("os"));
        }
        if self.register_jitter && self.jitter_threshold == 0 {
            return Err(ConfigError::ZeroThreshold("jitter"));
        }
        if !self.register_os && !self.register_jitter {
            return Err(ConfigError::NoSourcesEnabled);
        }
        Ok(())
    }

    /// Builds an accumulator with the configured sources registered.
    pub fn build(&self) -> Result<EntropyAccumulator, EntropyError> {
        let accumulator = EntropyAccumulator::new();
        if self.register_jitter {
            accumulator.add_source(
                Box::new(JitterSource::new()),
                self.jitter_threshold,
                Strength::Weak,
            )?;
        }
        if self.register_os {
            accumulator.add_source(Box::new(OsSource::new()), self.os_threshold, Strength::Strong)?;
        }
        Ok(accumulator)
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// A source is enabled with a zero byte threshold.
    #[error("threshold for {0} source must be greater than zero")]
    ZeroThreshold(&'static str),
    /// Every built-in source is disabled.
    #[error("no sources enabled")]
    NoSourcesEnabled,
    /// The configured output length exceeds one hash block.
    #[error("output length must be 1-{} bytes", BLOCK_SIZE)]
    InvalidOutputLength,
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Source registration settings.
    #[serde(default)]
    pub accumulator: AccumulatorConfig,
    /// Demo binary output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Demo output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Number of random bytes to produce per extraction.
    pub bytes: usize,
    /// Gather rounds run before the first extraction.
    pub prewarm_rounds: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            bytes: 32,
            prewarm_rounds: 1,
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: FileConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.accumulator.validate()?;
        if self.output.bytes == 0 || self.output.bytes > BLOCK_SIZE {
            return Err(ConfigError::InvalidOutputLength);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_threshold_invalid() {
        let mut config = AccumulatorConfig::default();
        config.os_threshold = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroThreshold("os"))
        ));
    }

    #[test]
    fn test_all_sources_disabled_invalid() {
        let config = AccumulatorConfig {
            register_os: false,
            register_jitter: false,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NoSourcesEnabled)
        ));
    }

    #[test]
    fn test_oversized_output_invalid() {
        let mut config = FileConfig::default();
        config.output.bytes = BLOCK_SIZE + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidOutputLength)
        ));
    }

    #[test]
    fn test_parse_toml() {
        let config: FileConfig = toml::from_str(
            r#"
            [accumulator]
            register_os = true
            os_threshold = 48
            register_jitter = false
            jitter_threshold = 4

            [output]
            bytes = 16
            prewarm_rounds = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.accumulator.os_threshold, 48);
        assert!(!config.accumulator.register_jitter);
        assert_eq!(config.output.bytes, 16);
    }

    #[test]
    fn test_build_registers_configured_sources() {
        let accumulator = AccumulatorConfig::default().build().unwrap();
        assert_eq!(accumulator.source_count(), 2);
    }
}
