//! Error types for Nitro
//!
//! This module defines all error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::api::diagnostics::ApplicationError;

/// Main error type for Nitro operations
///
/// Transport failures (`Timeout`, `NetworkFailure`) are retried by the
/// resilient client and only surface once every attempt has failed.
/// `HttpStatus` and `Application` are never retried. `CorruptState` is
/// recovered by the session store and only ever logged.
#[derive(Error, Debug)]
pub enum NitroError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A single attempt exceeded its time budget
    #[error("Request to {endpoint} timed out after {timeout_ms} ms")]
    Timeout {
        /// Endpoint that was being called
        endpoint: String,
        /// Per-attempt timeout that was exceeded
        timeout_ms: u64,
    },

    /// The transport could not complete the request
    #[error("Network failure calling {endpoint}: {message}")]
    NetworkFailure {
        /// Endpoint that was being called
        endpoint: String,
        /// Transport error description
        message: String,
    },

    /// The backend answered with a non-2xx status
    #[error("HTTP {status} from {endpoint}: {body}")]
    HttpStatus {
        /// Endpoint that was called
        endpoint: String,
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The backend answered successfully but reported a misconfiguration
    #[error("Backend error: {0}")]
    Application(ApplicationError),

    /// Persisted local state could not be decoded
    #[error("Corrupt stored state under '{key}': {message}")]
    CorruptState {
        /// Storage key holding the bad value
        key: String,
        /// Decoder error description
        message: String,
    },

    /// Requested session does not exist
    #[error("Session not found: {0}")]
    NotFound(String),

    /// Local storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// SQLite errors from the local storage backend
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl NitroError {
    /// Whether this error is a transport failure (timeout or network)
    ///
    /// # Examples
    ///
    /// ```
    /// use nitro::error::NitroError;
    ///
    /// let err = NitroError::Timeout { endpoint: "/chat".into(), timeout_ms: 10 };
    /// assert!(err.is_transport());
    /// assert!(!NitroError::NotFound("x".into()).is_transport());
    /// ```
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::NetworkFailure { .. })
    }
}

/// Result type alias for Nitro operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation. Callers that
/// need to branch on the failure class downcast to [`NitroError`].
pub type Result<T> = anyhow::Result<T>;
