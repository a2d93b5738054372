//! Badge engine - one learner session
//!
//! Wires the tracker, evaluator and reveal queue together behind the two
//! inbound signals of the UI:
//!
//! ```text
//! on_scenario_completed ──▶ tracker ──▶ evaluator ──▶ reveal queue (defer)
//! on_reflection_completed ─────────────────────────▶ reveal queue (release)
//! ```
//!
//! Every mutating call persists the progress state. A failing store never
//! fails the call: the engine keeps working in memory, retries the save on
//! the next mutating call and raises one storage warning per session.
//!
//! Nothing is saved for a learner whose persisted state could not be read.
//! The load is retried on every signal; once it succeeds the session's
//! progress is merged into the persisted state and saving resumes.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use super::evaluator::TierEvaluator;
use super::progress::CategoryProgress;
use super::reveal::{DeferredEntry, DeferredRevealQueue};
use super::state::ProgressState;
use super::tracker::CompletionTracker;
use super::BadgeError;
use crate::config::{Settings, TierCatalog};
use crate::domain::{Badge, CategoryId, LearnerId, ScenarioId};
use crate::store::StateStore;

/// What happened when a scenario completion was recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReport {
    pub category: CategoryId,
    pub scenario: ScenarioId,
    pub is_new_completion: bool,
    pub new_count: usize,
    /// Badges unlocked by this completion, now waiting for the reflection step
    pub newly_unlocked: Vec<Badge>,
    /// Entry dropped from the full reveal queue to make room, if any
    pub evicted: Option<DeferredEntry>,
}

/// User-facing notice that progress could not be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageWarning {
    pub message: String,
}

/// Resets made while the persisted state was unreadable, replayed onto it
/// once it loads
#[derive(Debug, Default)]
struct UnloadedResets {
    all: bool,
    categories: Vec<CategoryId>,
}

/// Badge bookkeeping for one learner session
pub struct BadgeEngine<S: StateStore> {
    learner: LearnerId,
    tracker: CompletionTracker,
    evaluator: TierEvaluator,
    queue: DeferredRevealQueue,
    store: S,
    pending_ttl: Option<Duration>,
    /// State changed since the last successful save
    dirty: bool,
    /// Set while the persisted state has not been read yet
    unloaded: Option<UnloadedResets>,
    storage_warned: bool,
    pending_warning: Option<StorageWarning>,
}

impl<S: StateStore> BadgeEngine<S> {
    /// Start a session, loading the learner's persisted progress.
    ///
    /// The store is the only source of truth at startup. If it cannot be
    /// read the session starts empty, a storage warning is raised and no
    /// save happens until a later load succeeds.
    pub fn open(learner: LearnerId, catalog: Arc<TierCatalog>, settings: &Settings, store: S) -> Self {
        let mut engine = Self {
            learner,
            tracker: CompletionTracker::new(),
            evaluator: TierEvaluator::new(catalog),
            queue: DeferredRevealQueue::new(settings.max_pending_entries),
            store,
            pending_ttl: settings.pending_ttl(),
            dirty: false,
            unloaded: None,
            storage_warned: false,
            pending_warning: None,
        };

        match engine.store.load_state(&engine.learner) {
            Ok(Some(state)) => {
                debug!(learner = %engine.learner, "Loaded learner progress");
                engine.tracker = CompletionTracker::from_state(state);
            }
            Ok(None) => {
                debug!(learner = %engine.learner, "No saved progress, starting fresh");
            }
            Err(err) => {
                let err = BadgeError::storage(&err);
                warn!(learner = %engine.learner, "{}; continuing with empty progress", err);
                engine.unloaded = Some(UnloadedResets::default());
                engine.raise_storage_warning(format!(
                    "Your saved progress could not be loaded ({}). New progress is kept for this session.",
                    err
                ));
            }
        }

        engine
    }

    pub fn learner(&self) -> &LearnerId {
        &self.learner
    }

    pub fn state(&self) -> &ProgressState {
        self.tracker.state()
    }

    pub fn catalog(&self) -> &TierCatalog {
        self.evaluator.catalog()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn pending_reveals(&self) -> &DeferredRevealQueue {
        &self.queue
    }

    /// Whether the last save attempt failed and a retry is outstanding
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// "Scenario completed" signal
    pub fn on_scenario_completed(
        &mut self,
        category_id: &str,
        scenario_id: &str,
    ) -> Result<CompletionReport, BadgeError> {
        let category = CategoryId::new(category_id)?;
        let scenario = ScenarioId::new(scenario_id)?;
        self.ensure_loaded();
        self.collect_stale_reveals();

        let outcome = self.tracker.record(category.clone(), scenario.clone());
        let tiers = self.evaluator.evaluate(
            &category,
            outcome.new_count,
            self.tracker.unlocks_mut(&category),
        );

        let now = Utc::now();
        let newly_unlocked: Vec<Badge> = tiers
            .into_iter()
            .map(|tier| Badge::unlocked_at(category.clone(), tier, now))
            .collect();
        for badge in &newly_unlocked {
            info!(
                learner = %self.learner,
                category = %category,
                scenario = %scenario,
                requirement = badge.requirement(),
                "Badge unlocked: {}",
                badge.title()
            );
        }

        let evicted = self
            .queue
            .defer(scenario.clone(), category.clone(), newly_unlocked.clone());

        if outcome.is_new_completion || !newly_unlocked.is_empty() {
            self.dirty = true;
        }
        self.flush();

        Ok(CompletionReport {
            category,
            scenario,
            is_new_completion: outcome.is_new_completion,
            new_count: outcome.new_count,
            newly_unlocked,
            evicted,
        })
    }

    /// "Reflection completed" signal; returns the badges to present now
    pub fn on_reflection_completed(&mut self, scenario_id: &str) -> Result<Vec<Badge>, BadgeError> {
        let scenario = ScenarioId::new(scenario_id)?;
        self.ensure_loaded();
        self.collect_stale_reveals();
        let badges = self.queue.release(&scenario);
        self.flush();
        Ok(badges)
    }

    /// Drop the badges waiting on a scenario's reflection
    pub fn expire_pending(&mut self, scenario_id: &str) -> Result<usize, BadgeError> {
        let scenario = ScenarioId::new(scenario_id)?;
        Ok(self.queue.expire(&scenario))
    }

    /// Clear one category's completions and shown badges
    pub fn reset_category(&mut self, category_id: &str) -> Result<(), BadgeError> {
        let category = CategoryId::new(category_id)?;
        self.ensure_loaded();
        self.tracker.reset(category.as_str())?;
        if let Some(resets) = self.unloaded.as_mut() {
            resets.categories.push(category);
        }
        info!(learner = %self.learner, category = category_id, "Progress reset");
        self.dirty = true;
        self.flush();
        Ok(())
    }

    /// Clear every category
    pub fn reset_all(&mut self) {
        self.ensure_loaded();
        self.tracker.reset_all();
        if let Some(resets) = self.unloaded.as_mut() {
            resets.all = true;
            resets.categories.clear();
        }
        info!(learner = %self.learner, "All progress reset");
        self.dirty = true;
        self.flush();
    }

    /// End the session: discard unrevealed badges and retry an outstanding save.
    ///
    /// Returns the number of discarded badges.
    pub fn end_session(&mut self) -> usize {
        let discarded: usize = self
            .queue
            .expire_all()
            .iter()
            .map(|entry| entry.badges.len())
            .sum();
        self.flush();
        debug!(learner = %self.learner, discarded, "Session ended");
        discarded
    }

    pub fn completion_count(&self, category_id: &str) -> usize {
        self.tracker.completion_count(category_id)
    }

    /// Progress summary for one category
    pub fn progress(&self, category_id: &str) -> Result<CategoryProgress, BadgeError> {
        let category = CategoryId::new(category_id)?;
        Ok(self.progress_for(category))
    }

    /// Progress for every configured category, then any tracked category
    /// missing from the configuration
    pub fn overview(&self) -> Vec<CategoryProgress> {
        let catalog = self.evaluator.catalog();
        let mut ids: Vec<CategoryId> = catalog.categories().map(|c| c.id.clone()).collect();
        ids.extend(
            self.tracker
                .categories()
                .into_iter()
                .filter(|id| !catalog.contains(id)),
        );
        ids.into_iter().map(|id| self.progress_for(id)).collect()
    }

    /// The storage warning of this session, handed out once
    pub fn take_storage_warning(&mut self) -> Option<StorageWarning> {
        self.pending_warning.take()
    }

    fn progress_for(&self, category: CategoryId) -> CategoryProgress {
        let completed = self.tracker.completion_count(category.as_str());
        let tiers = self.evaluator.catalog().get(&category).ok();
        CategoryProgress::compute(category, tiers, completed)
    }

    fn collect_stale_reveals(&mut self) {
        if let Some(ttl) = self.pending_ttl {
            self.queue.expire_older_than(Utc::now(), ttl);
        }
    }

    /// Retry reading the persisted state after a failed load and merge this
    /// session's progress into it. Returns whether the state is loaded.
    fn ensure_loaded(&mut self) -> bool {
        let Some(resets) = self.unloaded.as_ref() else {
            return true;
        };

        match self.store.load_state(&self.learner) {
            Ok(stored) => {
                let mut stored = stored.unwrap_or_default();
                if resets.all {
                    stored.clear();
                }
                for category in &resets.categories {
                    stored.remove_category(category);
                }
                self.tracker.adopt_persisted(stored);
                self.unloaded = None;
                info!(learner = %self.learner, "Loaded learner progress after earlier failure");
                true
            }
            Err(err) => {
                debug!(learner = %self.learner, "{}; still unreadable", BadgeError::storage(&err));
                false
            }
        }
    }

    /// Save if anything changed since the last successful save
    fn flush(&mut self) {
        if !self.dirty {
            return;
        }
        if !self.ensure_loaded() {
            debug!(learner = %self.learner, "Persisted state not loaded, save skipped");
            return;
        }

        match self.store.save_state(&self.learner, self.tracker.state()) {
            Ok(()) => {
                self.dirty = false;
            }
            Err(err) => {
                let err = BadgeError::storage(&err);
                if self.storage_warned {
                    debug!(learner = %self.learner, "{}; will retry", err);
                } else {
                    warn!(learner = %self.learner, "{}; progress kept in memory, will retry", err);
                }
                self.raise_storage_warning(format!(
                    "Your progress could not be saved ({}). It is kept for this session.",
                    err
                ));
            }
        }
    }

    fn raise_storage_warning(&mut self, message: String) {
        if self.storage_warned {
            return;
        }
        self.storage_warned = true;
        self.pending_warning = Some(StorageWarning { message });
    }
}
