//! Runtime configuration for simpl-filters
//!
//! Controls the tuple-parallel algorithm variants and logging. Configuration
//! is plain serde data and can be read from TOML or JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Log levels accepted by [`LoggingConfig::level`]
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Process-wide configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Tuple-parallel algorithm settings
    pub parallel: ParallelConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Tuple-parallel algorithm configuration.
///
/// Only has an effect when the crate is built with the `parallel` feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Allow algorithms to split work across threads
    pub enabled: bool,
    /// Arrays with fewer tuples than this run sequentially
    pub min_tuples: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_tuples: 100_000,
        }
    }
}

impl ParallelConfig {
    /// Sequential everywhere
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Should an array of `num_tuples` tuples be processed in parallel?
    pub fn should_parallelize(&self, num_tuples: usize) -> bool {
        cfg!(feature = "parallel") && self.enabled && num_tuples >= self.min_tuples
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level, overridden by `SIMPL_LOG`
    pub level: String,
    /// Include the event target in formatted output
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_target: false,
        }
    }
}

impl RuntimeConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Toml(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Toml(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json_str).map_err(|e| ConfigError::Json(e.to_string()))
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Json(e.to_string()))
    }

    /// Load and validate a configuration file. `.json` files are read as
    /// JSON, everything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&contents)?,
            _ => Self::from_toml(&contents)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parallel.min_tuples == 0 {
            return Err(ConfigError::OutOfRange(
                "parallel.min_tuples must be positive".to_string(),
            ));
        }

        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::UnknownLevel(self.logging.level.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RuntimeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.logging.level, "info");
        assert!(config.parallel.enabled);
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = RuntimeConfig::default();
        config.parallel.min_tuples = 42;
        config.logging.with_target = true;

        let toml_str = config.to_toml().unwrap();
        let parsed = RuntimeConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = RuntimeConfig::default();
        let json = config.to_json().unwrap();
        let parsed = RuntimeConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = RuntimeConfig::from_toml("[logging]\nlevel = \"debug\"\n").unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.parallel, ParallelConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = RuntimeConfig::default();
        config.parallel.min_tuples = 0;
        assert!(matches!(config.validate(), Err(ConfigError::OutOfRange(_))));

        let mut config = RuntimeConfig::default();
        config.logging.level = "loud".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownLevel(_))
        ));
    }

    #[test]
    fn test_should_parallelize_respects_threshold() {
        let config = ParallelConfig {
            enabled: true,
            min_tuples: 10,
        };
        assert!(!config.should_parallelize(9));
        assert_eq!(config.should_parallelize(10), cfg!(feature = "parallel"));
        assert!(!ParallelConfig::disabled().should_parallelize(usize::MAX));
    }
}
