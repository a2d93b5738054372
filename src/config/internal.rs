//! Built-in badge configuration embedded at compile-time
//!
//! Used when no configuration file exists and written out by `simbadge init`.

use super::{Config, ConfigError};

/// Embedded defaults TOML content (compile-time)
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../assets/defaults.toml");

impl Config {
    /// Parse the embedded default configuration
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_toml(DEFAULT_CONFIG_TOML)
    }
}
