//! Error types for the reference host binary.
//!
//! [`SimError`] wraps every failure mode during startup and the simulation
//! run so that `main` can propagate with `?`.

use trailblazer_core::ConfigError;
use trailblazer_rules::RuleError;

/// Top-level error for the simulation binary.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// A configured rule is invalid.
    #[error("rule error: {source}")]
    Rule {
        /// The underlying rule error.
        #[from]
        source: RuleError,
    },

    /// An environment setting could not be parsed.
    #[error("invalid value for {name} ({value:?}): {reason}")]
    InvalidSetting {
        /// The environment variable.
        name: &'static str,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}
