use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CategoryId;

/// Icon used when a tier does not declare one
pub const DEFAULT_TIER_ICON: &str = "🏅";

/// One badge tier of a category
///
/// A tier is unlocked once the learner has completed at least
/// `requirement` distinct scenarios in the category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDefinition {
    pub requirement: u32,
    pub title: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TierDefinition {
    pub fn new(requirement: u32, title: impl Into<String>) -> Self {
        Self {
            requirement,
            title: title.into(),
            icon: DEFAULT_TIER_ICON.to_string(),
            description: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether a completion count reaches this tier
    pub fn is_unlocked_by(&self, count: usize) -> bool {
        count as u64 >= u64::from(self.requirement)
    }
}

/// A tier the learner has earned in a specific category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub category: CategoryId,
    pub tier: TierDefinition,
    pub unlocked_at: DateTime<Utc>,
}

impl Badge {
    pub fn new(category: CategoryId, tier: TierDefinition) -> Self {
        Self::unlocked_at(category, tier, Utc::now())
    }

    pub fn unlocked_at(category: CategoryId, tier: TierDefinition, at: DateTime<Utc>) -> Self {
        Self {
            category,
            tier,
            unlocked_at: at,
        }
    }

    pub fn requirement(&self) -> u32 {
        self.tier.requirement
    }

    pub fn title(&self) -> &str {
        &self.tier.title
    }
}
