//! Persistence of learner progress
//!
//! The engine only talks to the [`StateStore`] trait. Backends:
//!
//! - [`JsonFileStore`]: `<state_dir>/<learner>.json`, written atomically
//!   under an exclusive lock file. The lock covers a single write only:
//!   two sessions of one learner do not merge, the last save wins.
//! - [`SqliteStore`]: a single SQLite database in WAL mode
//! - [`MemoryStore`]: in-process, with switchable failures for tests

mod json;
mod memory;
mod sqlite;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::badges::ProgressState;
use crate::config::StateBackend;
use crate::domain::LearnerId;

/// Load/save collaborator for [`ProgressState`]
pub trait StateStore {
    /// Load the persisted state, `None` if the learner has none yet
    fn load_state(&self, learner: &LearnerId) -> Result<Option<ProgressState>>;

    /// Persist the full state, replacing what was stored before
    fn save_state(&self, learner: &LearnerId, state: &ProgressState) -> Result<()>;
}

impl<S: StateStore + ?Sized> StateStore for Box<S> {
    fn load_state(&self, learner: &LearnerId) -> Result<Option<ProgressState>> {
        (**self).load_state(learner)
    }

    fn save_state(&self, learner: &LearnerId, state: &ProgressState) -> Result<()> {
        (**self).save_state(learner, state)
    }
}

impl<S: StateStore + ?Sized> StateStore for &S {
    fn load_state(&self, learner: &LearnerId) -> Result<Option<ProgressState>> {
        (**self).load_state(learner)
    }

    fn save_state(&self, learner: &LearnerId, state: &ProgressState) -> Result<()> {
        (**self).save_state(learner, state)
    }
}

/// File name of the SQLite database inside the state directory
pub const SQLITE_FILE_NAME: &str = "progress.db";

/// Open the configured backend rooted at `state_dir`
pub fn open_store(backend: StateBackend, state_dir: &Path) -> Result<Box<dyn StateStore>> {
    match backend {
        StateBackend::Json => Ok(Box::new(JsonFileStore::new(state_dir))),
        StateBackend::Sqlite => Ok(Box::new(SqliteStore::open(
            &state_dir.join(SQLITE_FILE_NAME),
        )?)),
    }
}

/// `path` with `suffix` appended to its file name (`a.json` -> `a.json.lock`)
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Write `content` to `path` with an exclusive lock and an atomic rename.
///
/// The lock lives in a separate `<file>.lock` so the rename never replaces
/// the locked file. Parent directories are created as needed.
pub(crate) fn write_atomic_locked(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let lock_path = with_suffix(path, ".lock");
    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&lock_path)
        .with_context(|| format!("Failed to create lock file: {}", lock_path.display()))?;

    // Blocks until other writers are done
    lock_file
        .lock_exclusive()
        .with_context(|| format!("Failed to acquire lock: {}", lock_path.display()))?;

    let temp_path = with_suffix(path, ".tmp");
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

    temp_file
        .write_all(content)
        .with_context(|| format!("Failed to write: {}", temp_path.display()))?;
    temp_file
        .sync_all()
        .with_context(|| format!("Failed to sync: {}", temp_path.display()))?;

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename into place: {}", path.display()))?;

    // Lock is released when lock_file is dropped
    Ok(())
}
