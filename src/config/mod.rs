//! Configuration module.
//!
//! [`EngineConfig`] tunes the layout engine; [`loader`] reads it (plus the log
//! file location) from TOML with CLI/env precedence.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, ConfigError, ConfigFile,
    EngineSection, ResolvedConfig,
};

use crate::model::Insets;

/// Default growth of the valid rect, in viewport heights above and below.
pub const DEFAULT_VALID_RECT_BUFFER: f64 = 0.5;

/// Default height of the discardable rect, in viewport heights.
pub const DEFAULT_DISCARDABLE_FACTOR: f64 = 2.5;

/// Engine-level settings.
///
/// Owned by each engine instance; two engines never share defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Margins for regions without an override.
    pub default_margins: Insets,
    /// Padding for regions without an override.
    pub default_padding: Insets,
    /// Valid rect growth, in viewport heights on each side.
    pub valid_rect_buffer: f64,
    /// Discardable rect height, in viewport heights from the viewport top.
    pub discardable_factor: f64,
    /// Extra space after the last region.
    pub trailing_inset: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_margins: Insets::ZERO,
            default_padding: Insets::ZERO,
            valid_rect_buffer: DEFAULT_VALID_RECT_BUFFER,
            discardable_factor: DEFAULT_DISCARDABLE_FACTOR,
            trailing_inset: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_spacing() {
        let config = EngineConfig::default();
        assert_eq!(config.default_margins, Insets::ZERO);
        assert_eq!(config.default_padding, Insets::ZERO);
        assert_eq!(config.trailing_inset, 0.0);
    }

    #[test]
    fn default_config_uses_documented_factors() {
        let config = EngineConfig::default();
        assert_eq!(config.valid_rect_buffer, 0.5);
        assert_eq!(config.discardable_factor, 2.5);
    }

    #[test]
    fn default_config_is_copy() {
        let config = EngineConfig::default();
        let copied = config;
        assert_eq!(config, copied, "Copied config should equal original");
    }
}
