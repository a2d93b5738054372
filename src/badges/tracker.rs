//! Completion tracking
//!
//! Records which scenarios a learner finished per category. Completion is a
//! set: finishing the same scenario twice counts once.

use tracing::debug;

use super::state::{BadgeUnlockState, ProgressState};
use super::BadgeError;
use crate::domain::{CategoryId, ScenarioId};

/// Result of recording one completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub is_new_completion: bool,
    pub new_count: usize,
}

/// Owns the learner's [`ProgressState`]
#[derive(Debug, Clone, Default)]
pub struct CompletionTracker {
    state: ProgressState,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a previously persisted state
    pub fn from_state(state: ProgressState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// Record a finished scenario
    pub fn record_completion(
        &mut self,
        category_id: &str,
        scenario_id: &str,
    ) -> Result<CompletionOutcome, BadgeError> {
        let category = CategoryId::new(category_id)?;
        let scenario = ScenarioId::new(scenario_id)?;
        Ok(self.record(category, scenario))
    }

    /// Typed variant of [`record_completion`](Self::record_completion)
    pub fn record(&mut self, category: CategoryId, scenario: ScenarioId) -> CompletionOutcome {
        let record = self.state.completions.entry(category.clone()).or_default();
        let is_new_completion = record.scenarios.insert(scenario.clone());
        let new_count = record.count();

        debug!(
            category = %category,
            scenario = %scenario,
            is_new_completion,
            new_count,
            "Recorded completion"
        );

        CompletionOutcome {
            is_new_completion,
            new_count,
        }
    }

    /// Completed scenarios in a category (0 for unknown categories)
    pub fn completion_count(&self, category_id: &str) -> usize {
        CategoryId::new(category_id)
            .ok()
            .and_then(|id| self.state.completions.get(&id))
            .map(|record| record.count())
            .unwrap_or(0)
    }

    pub fn is_completed(&self, category: &CategoryId, scenario: &ScenarioId) -> bool {
        self.state
            .completions
            .get(category)
            .is_some_and(|r| r.scenarios.contains(scenario))
    }

    /// Completed scenarios of a category, sorted
    pub fn completed_scenarios(&self, category: &CategoryId) -> Vec<ScenarioId> {
        self.state
            .completions
            .get(category)
            .map(|r| r.scenarios.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Categories with at least one completion
    pub fn categories(&self) -> Vec<CategoryId> {
        self.state
            .completions
            .iter()
            .filter(|(_, r)| !r.scenarios.is_empty())
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Unlock state of a category, created on first access
    pub fn unlocks_mut(&mut self, category: &CategoryId) -> &mut BadgeUnlockState {
        self.state.unlocks.entry(category.clone()).or_default()
    }

    pub fn unlocks(&self, category: &CategoryId) -> Option<&BadgeUnlockState> {
        self.state.unlocks.get(category)
    }

    /// Clear a category's completions together with its shown tiers
    pub fn reset(&mut self, category_id: &str) -> Result<(), BadgeError> {
        let category = CategoryId::new(category_id)?;
        let removed = self.state.remove_category(&category);
        debug!(category = %category, removed, "Reset category progress");
        Ok(())
    }

    /// Clear every category
    pub fn reset_all(&mut self) {
        self.state.clear();
        debug!("Reset all progress");
    }

    /// Take a persisted state read after this tracker already recorded
    /// progress; the result holds both.
    pub fn adopt_persisted(&mut self, mut stored: ProgressState) {
        stored.merge(std::mem::take(&mut self.state));
        self.state = stored;
    }
}
