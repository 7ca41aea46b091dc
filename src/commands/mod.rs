/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`:     Interactive chat and one-shot `ask`
- `history`:  Local chat history listing, display and clearing
- `features`: Health, backend sessions, image, search, voice and video
- `prefs`:    Theme and language preferences

Handlers build an [`AppState`] (or only the local storage when no network
access is needed) from the loaded [`Config`].
*/

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use colored::Colorize;

use crate::app::AppState;
use crate::client::WakeSignal;
use crate::config::Config;
use crate::error::{NitroError, Result};
use crate::storage::{LocalStorage, SqliteLocalStorage};

pub mod chat;
pub mod features;
pub mod history;
pub mod prefs;
pub mod special_commands;

/// Prints the "server is waking up" notice on stderr
///
/// The notice is shown once until the backend answers again.
#[derive(Debug, Default)]
pub struct WakeBanner {
    shown: AtomicBool,
}

impl WakeBanner {
    /// Create a banner that has not been shown yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the waking notice is currently displayed
    pub fn is_shown(&self) -> bool {
        self.shown.load(Ordering::SeqCst)
    }
}

impl WakeSignal for WakeBanner {
    fn waking(&self, endpoint: &str) {
        if !self.shown.swap(true, Ordering::SeqCst) {
            eprintln!(
                "{} {}",
                "⏳ Server is waking up, retrying".yellow().bold(),
                endpoint.dimmed()
            );
        }
    }

    fn awake(&self) {
        if self.shown.swap(false, Ordering::SeqCst) {
            eprintln!("{}", "✓ Server is awake".green());
        }
    }
}

/// Open the configured local storage
pub fn open_storage(config: &Config) -> Result<Arc<dyn LocalStorage>> {
    let storage = SqliteLocalStorage::open_at(config.storage.path.as_deref())?;
    tracing::debug!(path = %storage.path().display(), "Opened local storage");
    Ok(Arc::new(storage))
}

/// Build application state with the terminal wake banner attached
pub fn open_state(config: &Config) -> Result<AppState> {
    let storage = open_storage(config)?;
    AppState::from_config_with_storage(config, storage, Some(Arc::new(WakeBanner::new())))
}

/// Print an error the way every handler reports failures
///
/// Application errors carry operator instructions and are shown in full;
/// transport errors get a hint that the backend may still be starting.
pub fn print_error(err: &anyhow::Error) {
    match err.downcast_ref::<NitroError>() {
        Some(NitroError::Application(app_error)) => {
            eprintln!("{} {}", "Backend configuration problem:".red().bold(), app_error.instruction());
            eprintln!("  {}", app_error.detail.dimmed());
        }
        Some(e) if e.is_transport() => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            eprintln!(
                "  {}",
                "The backend may still be starting. Use /retry (or run the command again) in a moment."
                    .dimmed()
            );
        }
        _ => eprintln!("{} {}", "Error:".red().bold(), err),
    }
}
