//! Configuration loading and management
//!
//! The badge configuration is a TOML file with a `[settings]` table and a
//! list of `[[category]]` entries, each carrying its `[[category.tier]]`
//! thresholds. Raw structures are deserialized here and validated into a
//! [`TierCatalog`] once at startup.

mod catalog;
mod internal;
mod io;
mod settings;

pub use catalog::{CategoryTiers, ConfigError, TierCatalog};
pub use internal::DEFAULT_CONFIG_TOML;
pub use settings::{Settings, StateBackend};

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub settings: Settings,

    /// Scenario categories and their badge tiers
    #[serde(default, rename = "category")]
    pub categories: Vec<CategoryConfig>,
}

/// One `[[category]]` entry as written in the file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub id: String,

    /// Display title (defaults to the id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Number of scenarios in the category, used for progress percentages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_scenarios: Option<u32>,

    #[serde(default, rename = "tier")]
    pub tiers: Vec<TierConfig>,
}

/// One `[[category.tier]]` entry as written in the file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierConfig {
    pub requirement: u32,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate settings and build the tier catalog
    pub fn catalog(&self) -> Result<TierCatalog, ConfigError> {
        self.settings.validate()?;
        TierCatalog::from_configs(&self.categories)
    }
}
