//! Logging setup
//!
//! Installs a `tracing-subscriber` formatter filtered by [`LoggingConfig`].
//! The `SIMPL_LOG` environment variable takes precedence over the configured
//! level and accepts full `EnvFilter` directives.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Environment variable that overrides the configured log level
pub const LOG_ENV_VAR: &str = "SIMPL_LOG";

/// Build the filter for `config`, preferring `SIMPL_LOG` when set
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed, in which case the
/// existing one is left in place.
pub fn init(config: &LoggingConfig) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(config.with_target)
        .try_init()
        .is_ok()
}
