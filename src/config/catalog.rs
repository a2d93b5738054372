//! Validated tier catalog
//!
//! The raw TOML structures in [`super::CategoryConfig`] are checked once and
//! turned into a [`TierCatalog`], which the evaluator treats as immutable
//! for the rest of the process.

use std::collections::{BTreeMap, HashSet};

use crate::badges::BadgeError;
use crate::domain::{CategoryId, DEFAULT_TIER_ICON, TierDefinition};

use super::{CategoryConfig, TierConfig};

/// Error type for catalog validation
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid category id {0:?}")]
    InvalidCategoryId(String),

    #[error("Duplicate category: {0}")]
    DuplicateCategory(String),

    #[error("Category {category}: tier requirement must be at least 1")]
    ZeroRequirement { category: String },

    #[error(
        "Category {category}: tier requirements must strictly increase ({previous} then {next})"
    )]
    RequirementOrder {
        category: String,
        previous: u32,
        next: u32,
    },

    #[error("Category {category}: tier {requirement} has an empty title")]
    EmptyTitle { category: String, requirement: u32 },

    #[error("Invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Tiers and metadata of one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTiers {
    pub id: CategoryId,
    pub title: String,
    /// Number of scenarios offered in the category, if known
    pub total_scenarios: Option<u32>,
    tiers: Vec<TierDefinition>,
}

impl CategoryTiers {
    /// Tiers in ascending requirement order
    pub fn tiers(&self) -> &[TierDefinition] {
        &self.tiers
    }

    pub fn tier(&self, requirement: u32) -> Option<&TierDefinition> {
        self.tiers.iter().find(|t| t.requirement == requirement)
    }
}

/// All categories and their tiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierCatalog {
    categories: BTreeMap<CategoryId, CategoryTiers>,
    /// Declaration order, used for listings
    order: Vec<CategoryId>,
}

impl TierCatalog {
    /// Validate raw category configs into a catalog
    pub fn from_configs(configs: &[CategoryConfig]) -> Result<Self, ConfigError> {
        let mut catalog = Self::default();
        let mut seen = HashSet::new();

        for config in configs {
            let id = CategoryId::new(config.id.as_str())
                .map_err(|_| ConfigError::InvalidCategoryId(config.id.clone()))?;
            if !seen.insert(id.clone()) {
                return Err(ConfigError::DuplicateCategory(config.id.clone()));
            }

            let tiers = validate_tiers(&config.id, &config.tiers)?;
            let title = config
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| config.id.clone());

            catalog.order.push(id.clone());
            catalog.categories.insert(
                id.clone(),
                CategoryTiers {
                    id,
                    title,
                    total_scenarios: config.total_scenarios,
                    tiers,
                },
            );
        }

        Ok(catalog)
    }

    /// Look up a category
    pub fn get(&self, id: &CategoryId) -> Result<&CategoryTiers, BadgeError> {
        self.categories
            .get(id)
            .ok_or_else(|| BadgeError::UnknownCategory(id.clone()))
    }

    pub fn contains(&self, id: &CategoryId) -> bool {
        self.categories.contains_key(id)
    }

    /// Categories in declaration order
    pub fn categories(&self) -> impl Iterator<Item = &CategoryTiers> {
        self.order.iter().filter_map(|id| self.categories.get(id))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn validate_tiers(category: &str, raw: &[TierConfig]) -> Result<Vec<TierDefinition>, ConfigError> {
    let mut tiers = Vec::with_capacity(raw.len());
    let mut previous: Option<u32> = None;

    for tier in raw {
        if tier.requirement == 0 {
            return Err(ConfigError::ZeroRequirement {
                category: category.to_string(),
            });
        }
        if let Some(prev) = previous.filter(|prev| tier.requirement <= *prev) {
            return Err(ConfigError::RequirementOrder {
                category: category.to_string(),
                previous: prev,
                next: tier.requirement,
            });
        }
        if tier.title.trim().is_empty() {
            return Err(ConfigError::EmptyTitle {
                category: category.to_string(),
                requirement: tier.requirement,
            });
        }

        previous = Some(tier.requirement);
        tiers.push(TierDefinition {
            requirement: tier.requirement,
            title: tier.title.clone(),
            icon: tier
                .icon
                .clone()
                .filter(|i| !i.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TIER_ICON.to_string()),
            description: tier.description.clone(),
        });
    }

    Ok(tiers)
}
