//! In-process store

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use anyhow::{Result, bail};

use super::StateStore;
use crate::badges::ProgressState;
use crate::domain::LearnerId;

/// Keeps states in memory. Failures can be switched on to simulate an
/// unavailable backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    states: RefCell<HashMap<LearnerId, ProgressState>>,
    fail_loads: Cell<bool>,
    fail_saves: Cell<bool>,
    save_attempts: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a learner's state
    pub fn with_state(self, learner: LearnerId, state: ProgressState) -> Self {
        self.states.borrow_mut().insert(learner, state);
        self
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.set(fail);
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    /// Number of `save_state` calls, successful or not
    pub fn save_attempts(&self) -> usize {
        self.save_attempts.get()
    }

    /// Currently stored state of a learner
    pub fn stored(&self, learner: &LearnerId) -> Option<ProgressState> {
        self.states.borrow().get(learner).cloned()
    }
}

impl StateStore for MemoryStore {
    fn load_state(&self, learner: &LearnerId) -> Result<Option<ProgressState>> {
        if self.fail_loads.get() {
            bail!("memory store unavailable (load)");
        }
        Ok(self.stored(learner))
    }

    fn save_state(&self, learner: &LearnerId, state: &ProgressState) -> Result<()> {
        self.save_attempts.set(self.save_attempts.get() + 1);
        if self.fail_saves.get() {
            bail!("memory store unavailable (save)");
        }
        self.states
            .borrow_mut()
            .insert(learner.clone(), state.clone());
        Ok(())
    }
}
