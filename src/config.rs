//! Configuration file parsing
//!
//! Reads pgsafemigrate.toml configuration files.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::annotations::AnchorPolicy;
use crate::output::OutputFormat;
use crate::rules::RuleRegistry;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "pgsafemigrate.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown rule alias '{0}'")]
    UnknownRule(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub rules: RulesConfig,

    #[serde(default)]
    pub annotations: AnnotationsConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    /// Rule aliases never evaluated, in any file
    #[serde(default)]
    pub excluded: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnnotationsConfig {
    /// Where a suppression annotation may sit: "marker" or "statement"
    #[serde(default)]
    pub anchor: AnchorPolicy,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Report format: "text" or "json"
    #[serde(default)]
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration from a file. Rule aliases are not checked here,
    /// see [`Config::validate`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Every excluded alias must name a registered rule.
    pub fn validate(&self, registry: &RuleRegistry) -> Result<(), ConfigError> {
        validate_aliases(&self.rules.excluded, registry)
    }
}

/// Reject the first alias the registry does not know.
pub fn validate_aliases<S: AsRef<str>>(
    aliases: &[S],
    registry: &RuleRegistry,
) -> Result<(), ConfigError> {
    match aliases.iter().find(|a| !registry.contains(a.as_ref())) {
        Some(unknown) => Err(ConfigError::UnknownRule(unknown.as_ref().to_string())),
        None => Ok(()),
    }
}
