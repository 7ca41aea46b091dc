//! Test utilities for Nitro
//!
//! This module provides common test utilities including temporary storage,
//! configuration fixtures, and assertion helpers.

use crate::config::Config;
use crate::storage::{LocalStorage, MemoryLocalStorage};
use std::sync::Arc;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Fresh in-memory local storage
pub fn memory_storage() -> Arc<dyn LocalStorage> {
    Arc::new(MemoryLocalStorage::new())
}

/// Default configuration with storage inside `dir`
pub fn test_config_in(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.storage.path = Some(dir.path().join("nitro.db"));
    config
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: anyhow::Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Create a test configuration YAML string
pub fn test_config_yaml() -> String {
    r#"
api:
  base_url: https://nitro.example.com
  api_key: test-key
  user_id: tester

request:
  retries: 1
  timeout_ms: 5000
  backoff_ms: 100

storage:
  max_sessions: 10
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NitroError;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_memory_storage_starts_empty() {
        let storage = memory_storage();
        assert!(storage.get("chats").unwrap().is_none());
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: anyhow::Result<()> =
            Err(NitroError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: anyhow::Result<()> = Ok(());
        assert_error_contains(result, "error");
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: anyhow::Result<()> =
            Err(NitroError::Config("different error".to_string()).into());
        assert_error_contains(result, "not present");
    }

    #[test]
    fn test_test_config_in_points_into_dir() {
        let dir = temp_dir();
        let config = test_config_in(&dir);
        assert!(config.storage.path.unwrap().starts_with(dir.path()));
    }

    #[test]
    fn test_test_config_yaml() {
        let yaml = test_config_yaml();
        let config: Config = serde_yaml::from_str(&yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.user_id, "tester");
        assert_eq!(config.request.policy().max_attempts(), 2);
        assert_eq!(config.storage.max_sessions, 10);
    }
}
