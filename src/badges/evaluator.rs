//! Tier evaluation
//!
//! Works like the milestone checks elsewhere in the app: walk the
//! thresholds in ascending order and collect the ones that are reached but
//! not yet recorded. Evaluation is consume-once: returned tiers are marked
//! as shown so repeated calls never announce them twice.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use super::state::BadgeUnlockState;
use super::BadgeError;
use crate::config::TierCatalog;
use crate::domain::{CategoryId, TierDefinition};

/// Computes newly unlocked tiers against the immutable catalog
#[derive(Debug, Clone)]
pub struct TierEvaluator {
    catalog: Arc<TierCatalog>,
    /// Unknown categories already reported
    reported_unknown: HashSet<CategoryId>,
}

impl TierEvaluator {
    pub fn new(catalog: Arc<TierCatalog>) -> Self {
        Self {
            catalog,
            reported_unknown: HashSet::new(),
        }
    }

    pub fn catalog(&self) -> &TierCatalog {
        &self.catalog
    }

    /// Tiers reached by `new_count` that were not shown yet, ascending.
    ///
    /// Marks the returned tiers as shown in `unlocks`. A lower count than
    /// before never removes anything from the shown set.
    pub fn evaluate(
        &mut self,
        category: &CategoryId,
        new_count: usize,
        unlocks: &mut BadgeUnlockState,
    ) -> Vec<TierDefinition> {
        let catalog = Arc::clone(&self.catalog);
        let tiers = match catalog.get(category) {
            Ok(entry) => entry.tiers(),
            Err(err) => {
                self.report_unknown(category, &err);
                return Vec::new();
            }
        };

        let mut newly_unlocked = Vec::new();
        for tier in tiers {
            if !tier.is_unlocked_by(new_count) {
                // Tiers are sorted, nothing further can be reached
                break;
            }
            if unlocks.mark_shown(tier.requirement) {
                newly_unlocked.push(tier.clone());
            }
        }

        if !newly_unlocked.is_empty() {
            debug!(
                category = %category,
                new_count,
                unlocked = newly_unlocked.len(),
                "Evaluated tiers"
            );
        }
        newly_unlocked
    }

    /// All tiers reached by `count`, without touching any state
    pub fn unlocked_tiers(&self, category: &CategoryId, count: usize) -> Vec<TierDefinition> {
        self.catalog
            .get(category)
            .map(|entry| {
                entry
                    .tiers()
                    .iter()
                    .take_while(|t| t.is_unlocked_by(count))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First tier not yet reached by `count`
    pub fn next_tier(&self, category: &CategoryId, count: usize) -> Option<&TierDefinition> {
        self.catalog
            .get(category)
            .ok()?
            .tiers()
            .iter()
            .find(|t| !t.is_unlocked_by(count))
    }

    fn report_unknown(&mut self, category: &CategoryId, err: &BadgeError) {
        if self.reported_unknown.insert(category.clone()) {
            warn!(category = %category, "{}; treating it as having no tiers", err);
        }
    }
}
