//! SQLite-backed key-value store for JSON blobs.
//!
//! Persisted keys: `settings` (versioned), `tasks`, `completedTasks`,
//! `theme`, and the transient session snapshot under `session`. Writes are
//! synchronous best-effort; there is no retry and no transaction spanning
//! a state change and its save.
//!
//! Load policy: a malformed blob never fails the caller. Tasks and history
//! recover through per-field serde defaults (or an empty collection when
//! the whole blob is unreadable); settings recover by a full reset when the
//! blob is unreadable or its version tag mismatches. Every fallback is
//! logged and followed by a fresh save.

use log::warn;
use rusqlite::{params, Connection};

use super::{data_dir, Theme};
use crate::engine::SessionState;
use crate::error::StorageError;
use crate::history::History;
use crate::settings::Settings;
use crate::task::TaskQueue;

pub const KEY_SETTINGS: &str = "settings";
pub const KEY_TASKS: &str = "tasks";
pub const KEY_COMPLETED_TASKS: &str = "completedTasks";
pub const KEY_THEME: &str = "theme";
pub const KEY_SESSION: &str = "session";

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open the store at `data_dir()/ritmo.db`, creating the schema if
    /// needed.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()
            .map_err(|e| StorageError::QueryFailed(format!("data dir: {e}")))?
            .join("ritmo.db");
        let conn = Connection::open(&path)
            .map_err(|source| StorageError::OpenFailed { path, source })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open a store at an explicit path (tests use a temp dir).
    pub fn open_at(path: &std::path::Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
            .map_err(StorageError::from)
    }

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM kv WHERE key = ?1")
            .map_err(StorageError::from)?;
        match stmt.query_row(params![key], |row| row.get::<_, String>(0)) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(StorageError::from)?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(StorageError::from)?;
        Ok(())
    }

    // ── Typed blobs ──────────────────────────────────────────────────

    /// Load settings, applying the version gate: a missing, unreadable or
    /// version-mismatched blob resets to defaults and re-saves.
    pub fn load_settings(&self) -> Result<Settings, StorageError> {
        if let Some(json) = self.kv_get(KEY_SETTINGS)? {
            match serde_json::from_str::<Settings>(&json) {
                Ok(settings) if settings.version_matches() => return Ok(settings),
                Ok(settings) => {
                    warn!(
                        "settings version '{}' does not match, resetting to defaults",
                        settings.version
                    );
                }
                Err(e) => {
                    warn!("settings blob unreadable ({e}), resetting to defaults");
                }
            }
        }
        let settings = Settings::default();
        self.save_settings(&settings)?;
        Ok(settings)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        let json = serde_json::to_string(settings)
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        self.kv_set(KEY_SETTINGS, &json)
    }

    pub fn load_tasks(&self) -> Result<TaskQueue, StorageError> {
        if let Some(json) = self.kv_get(KEY_TASKS)? {
            match serde_json::from_str::<TaskQueue>(&json) {
                // Re-impose priority order on load.
                Ok(queue) => return Ok(TaskQueue::from_tasks(queue.tasks().to_vec())),
                Err(e) => {
                    warn!("tasks blob unreadable ({e}), starting with an empty queue");
                    let queue = TaskQueue::default();
                    self.save_tasks(&queue)?;
                    return Ok(queue);
                }
            }
        }
        Ok(TaskQueue::default())
    }

    pub fn save_tasks(&self, queue: &TaskQueue) -> Result<(), StorageError> {
        let json =
            serde_json::to_string(queue).map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        self.kv_set(KEY_TASKS, &json)
    }

    pub fn load_history(&self) -> Result<History, StorageError> {
        if let Some(json) = self.kv_get(KEY_COMPLETED_TASKS)? {
            match serde_json::from_str::<History>(&json) {
                Ok(history) => return Ok(history),
                Err(e) => {
                    warn!("history blob unreadable ({e}), starting with an empty ledger");
                    let history = History::default();
                    self.save_history(&history)?;
                    return Ok(history);
                }
            }
        }
        Ok(History::default())
    }

    pub fn save_history(&self, history: &History) -> Result<(), StorageError> {
        let json =
            serde_json::to_string(history).map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        self.kv_set(KEY_COMPLETED_TASKS, &json)
    }

    pub fn load_theme(&self) -> Result<Theme, StorageError> {
        if let Some(json) = self.kv_get(KEY_THEME)? {
            match serde_json::from_str::<Theme>(&json) {
                Ok(theme) => return Ok(theme),
                Err(e) => warn!("theme blob unreadable ({e}), using the default"),
            }
        }
        Ok(Theme::default())
    }

    pub fn save_theme(&self, theme: Theme) -> Result<(), StorageError> {
        let json =
            serde_json::to_string(&theme).map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        self.kv_set(KEY_THEME, &json)
    }

    /// Load the transient session snapshot, if one was left behind. An
    /// unreadable snapshot is silently discarded.
    pub fn load_session(&self) -> Result<Option<SessionState>, StorageError> {
        if let Some(json) = self.kv_get(KEY_SESSION)? {
            match serde_json::from_str::<SessionState>(&json) {
                Ok(state) => return Ok(Some(state)),
                Err(e) => {
                    warn!("session snapshot unreadable ({e}), discarding");
                    self.kv_delete(KEY_SESSION)?;
                }
            }
        }
        Ok(None)
    }

    pub fn save_session(&self, state: &SessionState) -> Result<(), StorageError> {
        let json =
            serde_json::to_string(state).map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        self.kv_set(KEY_SESSION, &json)
    }
}
