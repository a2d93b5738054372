//! Per-category progress summaries (category headers, progress rings)

use serde::Serialize;

use crate::config::CategoryTiers;
use crate::domain::{CategoryId, TierDefinition};

/// Snapshot of a learner's progress in one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryProgress {
    pub category: CategoryId,
    pub title: String,
    pub completed: usize,
    pub total_scenarios: Option<u32>,
    /// Rounded down, capped at 100. `None` when the total is unknown.
    pub percent: Option<u8>,
    pub unlocked_tiers: Vec<TierDefinition>,
    pub next_tier: Option<TierDefinition>,
    /// Completions still needed for `next_tier`
    pub remaining_to_next: Option<usize>,
}

impl CategoryProgress {
    /// Build a summary from the catalog entry, if the category is known
    pub fn compute(category: CategoryId, tiers: Option<&CategoryTiers>, completed: usize) -> Self {
        let Some(entry) = tiers else {
            return Self {
                title: category.to_string(),
                category,
                completed,
                total_scenarios: None,
                percent: None,
                unlocked_tiers: Vec::new(),
                next_tier: None,
                remaining_to_next: None,
            };
        };

        let unlocked_tiers: Vec<TierDefinition> = entry
            .tiers()
            .iter()
            .take_while(|t| t.is_unlocked_by(completed))
            .cloned()
            .collect();
        let next_tier = entry
            .tiers()
            .iter()
            .find(|t| !t.is_unlocked_by(completed))
            .cloned();
        let remaining_to_next = next_tier
            .as_ref()
            .map(|t| (t.requirement as usize).saturating_sub(completed));

        Self {
            category,
            title: entry.title.clone(),
            completed,
            total_scenarios: entry.total_scenarios,
            percent: entry.total_scenarios.map(|total| percent(completed, total)),
            unlocked_tiers,
            next_tier,
            remaining_to_next,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total_scenarios
            .is_some_and(|total| self.completed >= total as usize)
    }
}

fn percent(completed: usize, total: u32) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (completed as u64 * 100) / u64::from(total);
    pct.min(100) as u8
}
