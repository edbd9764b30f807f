//! Configuration loading for the path engine.
//!
//! The configuration is an ordered list of rule entries plus the history
//! cache size. It is read from YAML (`trailblazer.yaml`) or from the host's
//! JSON dialect, which allows whole-line `//` comments. Rule entries stay
//! in their raw [`RuleSpec`] form here; defaults are resolved and the rules
//! validated when a [`RuleSet`] is built from them.
//!
//! # Bootstrap
//!
//! [`TrailblazerConfig::load_effective`] mirrors the host installation
//! step: it always (re)writes the embedded default as
//! `trailblazer-default.yaml` in the config directory, then uses the
//! operator's `trailblazer.yaml` from the same directory, or failing that
//! `trailblazer.json5`. When neither exists the embedded default applies.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use trailblazer_rules::{RuleError, RuleSet, RuleSpec};

/// File name of the operator's custom configuration.
pub const CUSTOM_CONFIG_FILE: &str = "trailblazer.yaml";

/// Custom configuration in the host's JSON dialect, used when no
/// [`CUSTOM_CONFIG_FILE`] exists.
pub const CUSTOM_JSON_CONFIG_FILE: &str = "trailblazer.json5";

/// File name the embedded default is written to for reference.
pub const DEFAULT_CONFIG_FILE: &str = "trailblazer-default.yaml";

/// The embedded default configuration.
pub const DEFAULT_CONFIG_YAML: &str = include_str!("../trailblazer-default.yaml");

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write a configuration file.
    #[error("failed to access config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// Failed to parse JSON content.
    #[error("failed to parse config JSON: {source}")]
    Json {
        /// The underlying JSON parse error.
        source: serde_json::Error,
    },

    /// A rule entry is malformed.
    #[error("invalid rule: {source}")]
    Rule {
        /// The underlying rule validation error.
        #[from]
        source: RuleError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(source: serde_json::Error) -> Self {
        Self::Json { source }
    }
}

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// The operator's custom file at the given path.
    Custom(PathBuf),
    /// The embedded default.
    Default,
}

/// Top-level path engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailblazerConfig {
    /// Rule entries in evaluation order; the first matching rule wins.
    #[serde(default)]
    pub rules: Vec<RuleSpec>,

    /// Maximum number of positions with tracked progress.
    #[serde(default = "default_step_cache_size", alias = "stepCacheSize")]
    pub step_cache_size: usize,
}

impl Default for TrailblazerConfig {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            step_cache_size: default_step_cache_size(),
        }
    }
}

impl TrailblazerConfig {
    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty YAML document deserializes as unit, not as a map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Parse configuration from JSON with whole-line `//` comments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the stripped text is not valid JSON.
    pub fn parse_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(&strip_comments(json))?)
    }

    /// Load configuration from a file, choosing the format by extension.
    ///
    /// `.json` and `.json5` are read as commented JSON, anything else as
    /// YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or a parse
    /// error for malformed content.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("json5"));
        if is_json {
            Self::parse_json(&contents)
        } else {
            Self::parse(&contents)
        }
    }

    /// The embedded default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] only if the embedded file is broken.
    pub fn embedded_default() -> Result<Self, ConfigError> {
        Self::parse(DEFAULT_CONFIG_YAML)
    }

    /// Write the embedded default into `dir` and load the effective
    /// configuration: `trailblazer.yaml` if present, then
    /// `trailblazer.json5`, else the default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the directory or default file cannot
    /// be written or the custom file cannot be read, or a parse error.
    pub fn load_effective(dir: &Path) -> Result<(Self, ConfigSource), ConfigError> {
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join(DEFAULT_CONFIG_FILE), DEFAULT_CONFIG_YAML)?;

        let custom = [CUSTOM_CONFIG_FILE, CUSTOM_JSON_CONFIG_FILE]
            .into_iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists());
        let Some(custom) = custom else {
            return Ok((Self::embedded_default()?, ConfigSource::Default));
        };
        tracing::info!(path = %custom.display(), "using custom configuration");
        let config = Self::from_file(&custom)?;
        Ok((config, ConfigSource::Custom(custom)))
    }

    /// Resolve and index the configured rules.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleError`] in configuration order.
    pub fn rule_set(&self) -> Result<RuleSet, RuleError> {
        RuleSet::from_specs(self.rules.clone())
    }
}

/// Drop every line whose first non-blank characters are `//`.
fn strip_comments(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for line in json.lines() {
        if !line.trim_start().starts_with("//") {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

const fn default_step_cache_size() -> usize {
    1000
}
