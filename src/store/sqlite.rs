//! SQLite store for learner progress
//!
//! Keeps every learner's state as a JSON document in one table, with the
//! same WAL setup and versioned migrations as the rest of our databases.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use super::StateStore;
use crate::badges::ProgressState;
use crate::domain::LearnerId;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS learner_state (
    learner_id TEXT PRIMARY KEY,
    state_json TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
"#;

/// Database wrapper shared between clones
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create state dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open state db: {}", path.display()))?;

        // WAL lets several processes read while one writes
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::init(conn)
    }

    /// In-memory database, mainly for tests
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("State DB lock poisoned"))
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA_SQL)?;

        let version: i32 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))
            .unwrap_or(0);

        if version < SCHEMA_VERSION {
            conn.execute(
                "INSERT OR REPLACE INTO schema_version VALUES (?1)",
                [SCHEMA_VERSION],
            )?;
        }
        Ok(())
    }
}

impl StateStore for SqliteStore {
    fn load_state(&self, learner: &LearnerId) -> Result<Option<ProgressState>> {
        let conn = self.conn()?;
        let json: Option<String> = conn
            .query_row(
                "SELECT state_json FROM learner_state WHERE learner_id = ?1",
                [learner.as_str()],
                |r| r.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to query state for {}", learner))?;
        drop(conn);

        json.map(|json| {
            ProgressState::from_json(&json)
                .with_context(|| format!("Failed to parse stored state for {}", learner))
        })
        .transpose()
    }

    fn save_state(&self, learner: &LearnerId, state: &ProgressState) -> Result<()> {
        let json = state.to_json().context("Failed to serialize learner state")?;
        let now = Utc::now().timestamp_millis();

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO learner_state (learner_id, state_json, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(learner_id) DO UPDATE SET
                state_json = ?2, updated_at = ?3
            "#,
            (learner.as_str(), &json, now),
        )
        .with_context(|| format!("Failed to save state for {}", learner))?;

        debug!(learner = %learner, "Saved state to sqlite");
        Ok(())
    }
}
