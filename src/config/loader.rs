//! Configuration file loading with precedence handling.

use super::EngineConfig;
use crate::model::Insets;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SCROLLSTACK_CONFIG";

/// Environment variable overriding the log file location.
pub const LOG_FILE_ENV_VAR: &str = "SCROLLSTACK_LOG_FILE";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permissions, not a file, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/scrollstack/config.toml`.
///
/// ```toml
/// log_file_path = "/tmp/scrollstack.log"
///
/// [engine]
/// default_margins = { bottom = 10.0 }
/// discardable_factor = 3.0
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Engine tuning.
    #[serde(default)]
    pub engine: Option<EngineSection>,
}

/// `[engine]` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    /// Margins for regions without an override.
    #[serde(default)]
    pub default_margins: Option<Insets>,
    /// Padding for regions without an override.
    #[serde(default)]
    pub default_padding: Option<Insets>,
    /// Valid rect growth, in viewport heights.
    #[serde(default)]
    pub valid_rect_buffer: Option<f64>,
    /// Discardable rect height, in viewport heights.
    #[serde(default)]
    pub discardable_factor: Option<f64>,
    /// Extra space after the last region.
    #[serde(default)]
    pub trailing_inset: Option<f64>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Engine settings.
    pub engine: EngineConfig,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            log_file_path: default_log_path(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/scrollstack/scrollstack.log` on Unix-like systems,
/// or the platform equivalent. Falls back to the current directory if no state
/// directory can be determined.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("scrollstack").join("scrollstack.log")
    } else {
        PathBuf::from("scrollstack.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/scrollstack/config.toml` on Unix, appropriate path on
/// other platforms. Returns `None` if no config directory can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("scrollstack").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `SCROLLSTACK_CONFIG` environment variable
/// 3. Default path `~/.config/scrollstack/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    let engine = match config.engine {
        None => defaults.engine,
        Some(section) => EngineConfig {
            default_margins: section
                .default_margins
                .unwrap_or(defaults.engine.default_margins),
            default_padding: section
                .default_padding
                .unwrap_or(defaults.engine.default_padding),
            valid_rect_buffer: section
                .valid_rect_buffer
                .unwrap_or(defaults.engine.valid_rect_buffer),
            discardable_factor: section
                .discardable_factor
                .unwrap_or(defaults.engine.discardable_factor),
            trailing_inset: section
                .trailing_inset
                .unwrap_or(defaults.engine.trailing_inset),
        },
    };

    ResolvedConfig {
        engine,
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `SCROLLSTACK_LOG_FILE`: Override log file path
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(path) = std::env::var(LOG_FILE_ENV_VAR) {
        config.log_file_path = PathBuf::from(path);
    }

    config
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only flags the user actually passed are applied.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    discardable_factor: Option<f64>,
    valid_rect_buffer: Option<f64>,
) -> ResolvedConfig {
    if let Some(factor) = discardable_factor {
        config.engine.discardable_factor = factor;
    }

    if let Some(buffer) = valid_rect_buffer {
        config.engine.valid_rect_buffer = buffer;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
