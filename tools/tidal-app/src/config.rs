//! Configuration loading and validation.
//!
//! Settings come from `tidal.toml` (or the file named by `--config`) with
//! every field optional, then command-line overrides are applied on top.
//! The ring does not check its own preconditions in release builds, so
//! they are enforced here, before a ring is ever built.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tidal_log::LogLevel;

use crate::cli::Cli;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "tidal.toml";

/// Top-level configuration loaded from `tidal.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// `[ring]` section.
    pub ring: RingConfig,
    /// `[log]` section.
    pub log: LogConfig,
    /// `[consumer]` section.
    pub consumer: ConsumerConfig,
}

/// `[ring]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RingConfig {
    /// Capacity in elements.
    pub capacity: usize,
    /// Bytes per element.
    #[serde(rename = "elem-size")]
    pub elem_size: usize,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            elem_size: 1,
        }
    }
}

/// `[log]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Maximum level name.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

/// `[consumer]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsumerConfig {
    /// Record terminator, matched against the first byte of each element.
    pub delimiter: char,
    /// Elements handed to the ring per write.
    pub chunk: usize,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            delimiter: '\n',
            chunk: 64,
        }
    }
}

/// A configuration value the application cannot run with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The ring capacity is zero or not a power of two.
    CapacityNotPowerOfTwo(usize),
    /// Elements must be at least one byte.
    ZeroElemSize,
    /// Writes must carry at least one element.
    ZeroChunk,
    /// The delimiter must fit in a single byte.
    DelimiterNotAscii(char),
    /// The log level name is not recognized.
    UnknownLogLevel(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityNotPowerOfTwo(n) => {
                write!(f, "ring capacity {n} is not a power of two")
            }
            Self::ZeroElemSize => f.write_str("ring element size must be at least 1"),
            Self::ZeroChunk => f.write_str("consumer chunk must be at least 1"),
            Self::DelimiterNotAscii(c) => write!(f, "delimiter {c:?} is not a single ASCII byte"),
            Self::UnknownLogLevel(name) => write!(f, "unknown log level '{name}'"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    /// Parses a configuration document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse configuration")
    }

    /// Loads `path`, or `tidal.toml` in the working directory when `path` is
    /// `None`. A missing default file yields the built-in defaults; a
    /// missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("in {}", path.display()))
    }

    /// Applies command-line overrides.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(capacity) = cli.capacity {
            self.ring.capacity = capacity;
        }
        if let Some(elem_size) = cli.elem_size {
            self.ring.elem_size = elem_size;
        }
        if let Some(level) = &cli.log_level {
            self.log.level.clone_from(level);
        }
    }

    /// Checks every value the ring and consumer rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.ring.capacity.is_power_of_two() {
            return Err(ConfigError::CapacityNotPowerOfTwo(self.ring.capacity));
        }
        if self.ring.elem_size == 0 {
            return Err(ConfigError::ZeroElemSize);
        }
        if self.consumer.chunk == 0 {
            return Err(ConfigError::ZeroChunk);
        }
        self.delimiter_byte()?;
        self.log_level()?;
        Ok(())
    }

    /// The delimiter as a byte.
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        u8::try_from(self.consumer.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or(ConfigError::DelimiterNotAscii(self.consumer.delimiter))
    }

    /// The configured maximum log level.
    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        LogLevel::from_name(&self.log.level)
            .ok_or_else(|| ConfigError::UnknownLogLevel(self.log.level.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn empty_document_gives_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.ring.capacity, 1024);
        assert_eq!(config.consumer.delimiter, '\n');
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [ring]
            capacity = 16

            [consumer]
            delimiter = ";"
            "#,
        )
        .unwrap();
        assert_eq!(config.ring.capacity, 16);
        assert_eq!(config.ring.elem_size, 1);
        assert_eq!(config.consumer.chunk, 64);
        assert_eq!(config.delimiter_byte(), Ok(b';'));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(AppConfig::from_toml("[ring]\nslots = 4\n").is_err());
    }

    #[test]
    fn validation_errors() {
        let mut config = AppConfig::default();
        config.ring.capacity = 12;
        assert_eq!(
            config.validate(),
            Err(ConfigError::CapacityNotPowerOfTwo(12))
        );

        config.ring.capacity = 0;
        assert_eq!(config.validate(), Err(ConfigError::CapacityNotPowerOfTwo(0)));

        config.ring.capacity = 8;
        config.ring.elem_size = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroElemSize));

        config.ring.elem_size = 1;
        config.consumer.chunk = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroChunk));

        config.consumer.chunk = 1;
        config.consumer.delimiter = 'é';
        assert_eq!(config.validate(), Err(ConfigError::DelimiterNotAscii('é')));

        config.consumer.delimiter = ',';
        config.log.level = "loud".into();
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownLogLevel("loud".into()))
        );
    }

    #[test]
    fn cli_overrides_file_values() {
        let mut config = AppConfig::from_toml("[ring]\ncapacity = 8\nelem-size = 4\n").unwrap();
        let cli = Cli::parse_from(["tidal", "--capacity", "32", "--log-level", "trace"]);
        config.apply_cli(&cli);
        assert_eq!(config.ring.capacity, 32);
        assert_eq!(config.ring.elem_size, 4);
        assert_eq!(config.log_level(), Ok(LogLevel::Trace));
    }

    #[test]
    fn missing_default_file_is_not_an_error() {
        // The test runner's working directory is the crate root, which has no tidal.toml.
        assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());
        assert!(AppConfig::load(Some(Path::new("does/not/exist.toml"))).is_err());
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ConfigError::CapacityNotPowerOfTwo(6).to_string(),
            "ring capacity 6 is not a power of two"
        );
        assert_eq!(
            ConfigError::UnknownLogLevel("x".into()).to_string(),
            "unknown log level 'x'"
        );
    }
}
