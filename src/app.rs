//! Application state
//!
//! Holds what the browser client kept in globals: the current local
//! session, the backend's conversation id, the input of the last failed
//! send and handles to the API, the session store and preferences. Sending
//! takes `&mut self`, so one state object never has two sends in flight.

use std::sync::Arc;

use crate::api::{ChatRequest, NitroApi};
use crate::client::WakeSignal;
use crate::config::Config;
use crate::error::{NitroError, Result};
use crate::preferences::Preferences;
use crate::storage::{LocalStorage, Session, SessionId, SessionStore, SqliteLocalStorage};

/// Shown when the backend answers with an empty reply
pub const EMPTY_REPLY_FALLBACK: &str = "Sorry, I could not generate a response.";

/// A successful chat exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Local session the exchange was recorded in
    pub session_id: SessionId,
    /// Assistant reply text
    pub text: String,
    /// Model that answered, if reported
    pub model: Option<String>,
    /// Where the answer came from, if reported
    pub source: Option<String>,
}

/// Explicit state of one chat front end
#[derive(Debug)]
pub struct AppState {
    api: NitroApi,
    store: SessionStore,
    preferences: Preferences,
    user_id: String,
    current_session: Option<SessionId>,
    remote_session: Option<String>,
    pending_retry: Option<String>,
}

impl AppState {
    /// Assemble state from its parts
    pub fn new(
        api: NitroApi,
        store: SessionStore,
        preferences: Preferences,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            api,
            store,
            preferences,
            user_id: user_id.into(),
            current_session: None,
            remote_session: None,
            pending_retry: None,
        }
    }

    /// Build state from configuration, opening the SQLite local storage
    pub fn from_config(config: &Config, wake_signal: Option<Arc<dyn WakeSignal>>) -> Result<Self> {
        let storage: Arc<dyn LocalStorage> =
            Arc::new(SqliteLocalStorage::open_at(config.storage.path.as_deref())?);
        Self::from_config_with_storage(config, storage, wake_signal)
    }

    /// Build state from configuration over an already opened storage
    pub fn from_config_with_storage(
        config: &Config,
        storage: Arc<dyn LocalStorage>,
        wake_signal: Option<Arc<dyn WakeSignal>>,
    ) -> Result<Self> {
        let mut api = NitroApi::from_config(config)?;
        if let Some(signal) = wake_signal {
            api = api.with_wake_signal(signal);
        }

        let store = SessionStore::load_with_capacity(storage.clone(), config.storage.max_sessions);
        Ok(Self::new(
            api,
            store,
            Preferences::new(storage),
            config.api.user_id.clone(),
        ))
    }

    /// Backend API
    pub fn api(&self) -> &NitroApi {
        &self.api
    }

    /// Local chat history
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Persisted preferences
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Local session new messages are appended to
    pub fn current_session(&self) -> Option<&str> {
        self.current_session.as_deref()
    }

    /// Input of the last send that failed and can be replayed
    pub fn pending_retry(&self) -> Option<&str> {
        self.pending_retry.as_deref()
    }

    /// Start a fresh conversation on the next send
    pub fn new_chat(&mut self) {
        self.current_session = None;
        self.remote_session = None;
    }

    /// Continue a stored conversation
    ///
    /// # Errors
    ///
    /// Returns [`NitroError::NotFound`] if no stored session has this id
    pub fn select_session(&mut self, session_id: &str) -> Result<&Session> {
        let session = self.store.load_session(session_id)?;
        self.current_session = Some(session.id.clone());
        self.remote_session = None;
        Ok(session)
    }

    /// Send a message and record the exchange
    ///
    /// On transport or HTTP failure the input is kept for
    /// [`AppState::retry_last`]. Application errors are returned as-is:
    /// retrying them cannot help until the backend is reconfigured.
    ///
    /// # Errors
    ///
    /// Returns [`NitroError::Config`] for empty input, or the error of the
    /// chat call.
    pub async fn send_message(&mut self, input: &str) -> Result<Reply> {
        let message = input.trim();
        if message.is_empty() {
            return Err(NitroError::Config("Message cannot be empty".to_string()).into());
        }

        let request = ChatRequest {
            message: message.to_string(),
            user_id: self.user_id.clone(),
            session_id: self.remote_session.clone(),
        };

        let response = match self.api.chat(&request).await {
            Ok(response) => response,
            Err(e) => {
                let transport_failure = e
                    .downcast_ref::<NitroError>()
                    .map(NitroError::is_transport)
                    .unwrap_or(false);
                if !transport_failure {
                    self.signal_awake();
                }
                let replayable = e
                    .downcast_ref::<NitroError>()
                    .map(|err| err.is_transport() || matches!(err, NitroError::HttpStatus { .. }))
                    .unwrap_or(false);
                if replayable {
                    self.pending_retry = Some(message.to_string());
                }
                return Err(e);
            }
        };

        self.signal_awake();
        self.pending_retry = None;
        if response.session_id.is_some() {
            self.remote_session = response.session_id.clone();
        }

        let text = if response.response.trim().is_empty() {
            EMPTY_REPLY_FALLBACK.to_string()
        } else {
            response.response
        };

        let session_id = match self
            .store
            .append_exchange(self.current_session.as_deref(), message, &text)
        {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Failed to persist chat history: {}", e);
                self.store
                    .sessions()
                    .first()
                    .map(|s| s.id.clone())
                    .unwrap_or_else(|| self.store.start_session())
            }
        };
        self.current_session = Some(session_id.clone());

        Ok(Reply {
            session_id,
            text,
            model: response.ai_model,
            source: response.ai_source,
        })
    }

    /// Replay the input of the last failed send
    ///
    /// # Errors
    ///
    /// Returns [`NitroError::Config`] if there is nothing to retry, or the
    /// error of the replayed send.
    pub async fn retry_last(&mut self) -> Result<Reply> {
        let input = self
            .pending_retry
            .clone()
            .ok_or_else(|| NitroError::Config("Nothing to retry".to_string()))?;
        tracing::info!("Retrying last message");
        self.send_message(&input).await
    }

    /// The backend answered, so any waking notice is over
    fn signal_awake(&self) {
        if let Some(signal) = self.api.client().wake_signal() {
            signal.awake();
        }
    }
}
