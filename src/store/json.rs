//! JSON file store: one file per learner

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::{StateStore, write_atomic_locked};
use crate::badges::ProgressState;
use crate::domain::LearnerId;

/// Stores each learner's state in `<dir>/<learner>.json`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding a learner's state.
    ///
    /// Bytes outside `[A-Za-z0-9_-]` are percent-encoded, so every learner id
    /// gets its own file name and none can escape the state directory.
    pub fn path_for(&self, learner: &LearnerId) -> PathBuf {
        let mut name = String::with_capacity(learner.as_str().len() + 5);
        for byte in learner.as_str().bytes() {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_') {
                name.push(char::from(byte));
            } else {
                name.push_str(&format!("%{:02X}", byte));
            }
        }
        name.push_str(".json");
        self.dir.join(name)
    }
}

impl StateStore for JsonFileStore {
    fn load_state(&self, learner: &LearnerId) -> Result<Option<ProgressState>> {
        let path = self.path_for(learner);
        if !path.exists() {
            debug!(learner = %learner, path = %path.display(), "No saved state");
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;
        let state = ProgressState::from_json(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;
        Ok(Some(state))
    }

    fn save_state(&self, learner: &LearnerId, state: &ProgressState) -> Result<()> {
        let path = self.path_for(learner);
        let content = state.to_json().context("Failed to serialize learner state")?;
        write_atomic_locked(&path, content.as_bytes())?;
        debug!(learner = %learner, path = %path.display(), "Saved state");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CategoryId, ScenarioId};
    use tempfile::tempdir;

    #[test]
    fn test_missing_learner_loads_none() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let learner = LearnerId::new("alice").unwrap();
        assert!(store.load_state(&learner).unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state"));
        let learner = LearnerId::new("alice").unwrap();

        let mut state = ProgressState::default();
        state
            .completions
            .entry(CategoryId::new("bias").unwrap())
            .or_default()
            .scenarios
            .insert(ScenarioId::new("hiring").unwrap());
        store.save_state(&learner, &state).unwrap();

        assert_eq!(store.load_state(&learner).unwrap(), Some(state));
    }

    #[test]
    fn test_learner_id_is_encoded() {
        let store = JsonFileStore::new("/state");
        let learner = LearnerId::new("../../etc/passwd").unwrap();
        let path = store.path_for(&learner);
        assert_eq!(path.parent(), Some(Path::new("/state")));
        assert_eq!(path, PathBuf::from("/state/%2E%2E%2F%2E%2E%2Fetc%2Fpasswd.json"));

        let dots = LearnerId::new("..").unwrap();
        assert_eq!(store.path_for(&dots), PathBuf::from("/state/%2E%2E.json"));
    }

    #[test]
    fn test_distinct_learners_get_distinct_files() {
        let store = JsonFileStore::new("/state");
        let ids = ["team/alice", "team_alice", "team.alice", "team%2Falice", "..", "learner-2"];
        let paths: std::collections::HashSet<PathBuf> = ids
            .iter()
            .map(|id| store.path_for(&LearnerId::new(*id).unwrap()))
            .collect();
        assert_eq!(paths.len(), ids.len());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let learner = LearnerId::new("alice").unwrap();
        std::fs::write(store.path_for(&learner), "not json").unwrap();

        let err = store.load_state(&learner).unwrap_err();
        assert!(format!("{:#}", err).contains("alice.json"));
    }
}
