//! Durable per-device key-value storage with day-based expiry, and the typed
//! preferences the app keeps in it.
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use gloo_storage::{LocalStorage, Storage};

mod preferences;

pub use preferences::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend failed: {0}")]
    Backend(String),
    #[error("could not encode value: {0}")]
    Encode(String),
}

/// `get`/`set` contract shared by every storage backend. Reads never fail:
/// absent, expired and unreadable entries all come back as `None`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str, ttl_days: u32) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredValue {
    value: String,
    /// Unix seconds.
    expires_at: i64,
}

impl StoredValue {
    fn new(value: &str, ttl_days: u32) -> Self {
        Self {
            value: value.to_string(),
            expires_at: Utc::now().timestamp() + i64::from(ttl_days) * 86_400,
        }
    }

    fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.expires_at
    }

    fn live(self) -> Option<String> {
        if self.is_expired() {
            None
        } else {
            Some(self.value)
        }
    }
}

/// Process-local store, used by tests and as the fallback when no durable
/// backend can be opened. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, StoredValue>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a raw value without the expiry envelope handling, for seeding
    /// entries that are already expired.
    #[cfg(test)]
    fn insert_expired(&self, key: &str, value: &str) {
        self.entries.borrow_mut().insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at: Utc::now().timestamp() - 1,
            },
        );
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()?.live()
    }

    fn set(&self, key: &str, value: &str, ttl_days: u32) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), StoredValue::new(value, ttl_days));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Browser localStorage; each value is wrapped with its expiry.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStore;

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::get::<StoredValue>(key).ok()?.live()
    }

    fn set(&self, key: &str, value: &str, ttl_days: u32) -> Result<(), StorageError> {
        LocalStorage::set(key, StoredValue::new(value, ttl_days))
            .map_err(|e| StorageError::Backend(e.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        LocalStorage::delete(key);
        Ok(())
    }
}

/// SQLite-backed store for native builds.
#[cfg(not(target_arch = "wasm32"))]
pub struct SqliteStore {
    conn: rusqlite::Connection,
}

#[cfg(not(target_arch = "wasm32"))]
impl SqliteStore {
    pub fn open(path: &std::path::Path) -> Result<Self, StorageError> {
        let conn = rusqlite::Connection::open(path)
            .map_err(|e| StorageError::Backend(format!("Failed to open database: {}", e)))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = rusqlite::Connection::open_in_memory()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Self::with_connection(conn)
    }

    /// Opens `ramadan-companion.db` in the platform data directory.
    pub fn open_default() -> Result<Self, StorageError> {
        let dir = dirs::data_dir()
            .map(|dir| dir.join("ramadan-companion"))
            .unwrap_or_else(|| std::path::PathBuf::from(".ramadan-companion"));
        std::fs::create_dir_all(&dir).map_err(|e| StorageError::Backend(e.to_string()))?;
        Self::open(&dir.join("ramadan-companion.db"))
    }

    fn with_connection(conn: rusqlite::Connection) -> Result<Self, StorageError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(Self { conn })
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Option<String> {
        let result: Result<(String, i64), rusqlite::Error> = self.conn.query_row(
            "SELECT value, expires_at FROM preferences WHERE key = ?1",
            [key],
            |row: &rusqlite::Row| Ok((row.get(0)?, row.get(1)?)),
        );
        let (value, expires_at) = result.ok()?;
        StoredValue { value, expires_at }.live()
    }

    fn set(&self, key: &str, value: &str, ttl_days: u32) -> Result<(), StorageError> {
        let stored = StoredValue::new(value, ttl_days);
        self.conn
            .execute(
                "INSERT OR REPLACE INTO preferences (key, value, expires_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![key, stored.value, stored.expires_at],
            )
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM preferences WHERE key = ?1", [key])
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }
}

/// The durable store for the current platform, or an in-memory one when it
/// cannot be opened.
#[cfg(target_arch = "wasm32")]
pub fn default_store() -> Rc<dyn KeyValueStore> {
    Rc::new(BrowserStore)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> Rc<dyn KeyValueStore> {
    match SqliteStore::open_default() {
        Ok(store) => Rc::new(store),
        Err(err) => {
            tracing::warn!("preferences will not persist: {err}");
            Rc::new(MemoryStore::new())
        }
    }
}
