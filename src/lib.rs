//! Nitro - client library for the Nitro AI backend
//!
//! This library provides a resilient HTTP client for a backend that may be
//! asleep on a free hosting tier, a bounded local chat history, and the
//! command handlers of the `nitro` binary.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `client`: Resilient request client (timeout, retry, wake signal)
//! - `api`: Typed backend endpoints and application-error detection
//! - `storage`: Local key-value storage and the bounded session store
//! - `preferences`: Persisted theme and language
//! - `app`: Explicit application state tying the pieces together
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use nitro::{AppState, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let mut state = AppState::from_config(&config, None)?;
//!     let reply = state.send_message("Hello!").await?;
//!     println!("{}", reply.text);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod app;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod preferences;
pub mod storage;

// Re-export commonly used types
pub use app::{AppState, Reply};
pub use client::{RequestPolicy, ResilientClient, WakeSignal};
pub use config::Config;
pub use error::{NitroError, Result};
pub use storage::SessionStore;

#[cfg(test)]
pub mod test_utils;
