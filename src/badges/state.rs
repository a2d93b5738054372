//! Persistable learner progress
//!
//! [`ProgressState`] is the unit handed to a [`StateStore`](crate::store::StateStore):
//! the completion records and badge unlock state of every category for one
//! learner. It is plain data and serializes to JSON.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::{CategoryId, ScenarioId};

/// Version written into every serialized state
pub const STATE_SCHEMA_VERSION: u32 = 1;

fn default_version() -> u32 {
    STATE_SCHEMA_VERSION
}

/// Completed scenarios of one category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    #[serde(default)]
    pub scenarios: BTreeSet<ScenarioId>,
}

impl CompletionRecord {
    pub fn count(&self) -> usize {
        self.scenarios.len()
    }
}

/// Tiers already announced for one category, keyed by tier requirement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeUnlockState {
    #[serde(default)]
    pub shown: BTreeSet<u32>,
}

impl BadgeUnlockState {
    pub fn is_shown(&self, requirement: u32) -> bool {
        self.shown.contains(&requirement)
    }

    pub fn mark_shown(&mut self, requirement: u32) -> bool {
        self.shown.insert(requirement)
    }
}

/// Everything persisted for a learner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub completions: BTreeMap<CategoryId, CompletionRecord>,

    #[serde(default)]
    pub unlocks: BTreeMap<CategoryId, BadgeUnlockState>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            version: STATE_SCHEMA_VERSION,
            completions: BTreeMap::new(),
            unlocks: BTreeMap::new(),
        }
    }
}

impl ProgressState {
    pub fn is_empty(&self) -> bool {
        self.completions.values().all(|r| r.scenarios.is_empty())
            && self.unlocks.values().all(|u| u.shown.is_empty())
    }

    /// Union `other` into this state: completions and shown tiers of both
    pub fn merge(&mut self, other: ProgressState) {
        for (category, record) in other.completions {
            self.completions
                .entry(category)
                .or_default()
                .scenarios
                .extend(record.scenarios);
        }
        for (category, unlocks) in other.unlocks {
            self.unlocks.entry(category).or_default().shown.extend(unlocks.shown);
        }
    }

    /// Drop a category's completions and shown tiers; returns the removed completion count
    pub fn remove_category(&mut self, category: &CategoryId) -> usize {
        self.unlocks.remove(category);
        self.completions
            .remove(category)
            .map(|r| r.count())
            .unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.completions.clear();
        self.unlocks.clear();
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
