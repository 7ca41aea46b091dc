use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;
use nitro::storage::SqliteLocalStorage;
use nitro::WakeSignal;

#[allow(dead_code)]
pub fn create_temp_storage() -> (Arc<SqliteLocalStorage>, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("local_storage.db");
    let storage = SqliteLocalStorage::new_with_path(db_path)
        .expect("failed to create sqlite storage with path");
    (Arc::new(storage), tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Wake signal that counts notifications
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct CountingSignal {
    waking: AtomicUsize,
    awake: AtomicUsize,
}

#[allow(dead_code)]
impl CountingSignal {
    pub fn waking_count(&self) -> usize {
        self.waking.load(Ordering::SeqCst)
    }

    pub fn awake_count(&self) -> usize {
        self.awake.load(Ordering::SeqCst)
    }
}

impl WakeSignal for CountingSignal {
    fn waking(&self, _endpoint: &str) {
        self.waking.fetch_add(1, Ordering::SeqCst);
    }

    fn awake(&self) {
        self.awake.fetch_add(1, Ordering::SeqCst);
    }
}
