//! Durable local key-value storage
//!
//! The browser client kept its chat history and preferences in
//! `localStorage`. [`LocalStorage`] is the same contract: string keys,
//! string values, whole-value overwrite. [`SqliteLocalStorage`] persists to
//! a single-table SQLite file; [`MemoryLocalStorage`] keeps everything in
//! process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{NitroError, Result};

/// Environment variable that overrides the storage file location
pub const STORAGE_PATH_ENV: &str = "NITRO_STORAGE_PATH";

/// String key-value store with whole-value overwrite semantics
pub trait LocalStorage: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// SQLite-backed local storage
#[derive(Debug, Clone)]
pub struct SqliteLocalStorage {
    db_path: PathBuf,
}

impl SqliteLocalStorage {
    /// Open storage at the default location
    ///
    /// Honors `NITRO_STORAGE_PATH`; otherwise uses `local_storage.db` in the
    /// platform data directory.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var(STORAGE_PATH_ENV) {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("ai", "nitro", "nitro")
            .ok_or_else(|| NitroError::Storage("Could not determine data directory".into()))?;

        Self::new_with_path(proj_dirs.data_dir().join("local_storage.db"))
    }

    /// Open storage backed by the given database file
    ///
    /// Missing parent directories are created.
    ///
    /// # Examples
    ///
    /// ```
    /// use nitro::storage::{LocalStorage, SqliteLocalStorage};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let storage = SqliteLocalStorage::new_with_path(dir.path().join("kv.db")).unwrap();
    /// storage.set("theme", "dark").unwrap();
    /// assert_eq!(storage.get("theme").unwrap().as_deref(), Some("dark"));
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| NitroError::Storage(e.to_string()))?;
        }

        let storage = Self { db_path };
        storage.init()?;
        Ok(storage)
    }

    /// Open storage at `path` when given, otherwise at the default location
    pub fn open_at(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::new_with_path(path),
            None => Self::new(),
        }
    }

    /// Location of the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| NitroError::Storage(e.to_string()).into())
    }

    fn init(&self) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS local_storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| NitroError::Storage(e.to_string()))?;
        Ok(())
    }
}

impl LocalStorage for SqliteLocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.open()?;
        let value = conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("Failed to read key")
            .map_err(|e| NitroError::Storage(e.to_string()))?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO local_storage (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .context("Failed to write key")
        .map_err(|e| NitroError::Storage(e.to_string()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.open()?;
        conn.execute("DELETE FROM local_storage WHERE key = ?", params![key])
            .context("Failed to delete key")
            .map_err(|e| NitroError::Storage(e.to_string()))?;
        Ok(())
    }
}

/// In-process local storage
#[derive(Debug, Default)]
pub struct MemoryLocalStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryLocalStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| NitroError::Storage("memory storage lock poisoned".into()).into())
    }
}

impl LocalStorage for MemoryLocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
