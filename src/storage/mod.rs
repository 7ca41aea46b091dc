//! Bounded chat session store
//!
//! Keeps the chat history in memory, most recently active session first,
//! and mirrors the whole list to [`LocalStorage`] under [`CHATS_KEY`] after
//! every mutation. History is best-effort: undecodable stored data is
//! logged and replaced by an empty store.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{NitroError, Result};

pub mod local;
pub mod types;

pub use local::{LocalStorage, MemoryLocalStorage, SqliteLocalStorage};
pub use types::{Message, Role, Session, SessionId, SessionSummary, UNTITLED_SESSION};

/// Storage key holding the serialized session list
pub const CHATS_KEY: &str = "chats";

/// Default maximum number of stored sessions
pub const DEFAULT_MAX_SESSIONS: usize = 50;

/// Maximum number of characters taken from the first user message as title
pub const TITLE_MAX_CHARS: usize = 50;

/// Ordered, bounded collection of chat sessions
pub struct SessionStore {
    storage: Arc<dyn LocalStorage>,
    sessions: Vec<Session>,
    max_sessions: usize,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.sessions.len())
            .field("max_sessions", &self.max_sessions)
            .finish()
    }
}

impl SessionStore {
    /// Load the store from `storage` with the default session cap
    pub fn load(storage: Arc<dyn LocalStorage>) -> Self {
        Self::load_with_capacity(storage, DEFAULT_MAX_SESSIONS)
    }

    /// Load the store from `storage`, keeping at most `max_sessions`
    ///
    /// Never fails: a missing key yields an empty store, and unreadable or
    /// malformed data is reported as [`NitroError::CorruptState`] in the log
    /// and discarded.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use nitro::storage::{LocalStorage, MemoryLocalStorage, SessionStore};
    ///
    /// let storage = Arc::new(MemoryLocalStorage::new());
    /// storage.set("chats", "{not json").unwrap();
    ///
    /// let store = SessionStore::load_with_capacity(storage, 10);
    /// assert!(store.is_empty());
    /// ```
    pub fn load_with_capacity(storage: Arc<dyn LocalStorage>, max_sessions: usize) -> Self {
        let max_sessions = max_sessions.max(1);
        let mut sessions = match Self::read_sessions(storage.as_ref()) {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!("Discarding stored chat history: {}", e);
                Vec::new()
            }
        };

        if sessions.len() > max_sessions {
            tracing::debug!(
                stored = sessions.len(),
                max_sessions,
                "Truncating stored chat history to capacity"
            );
            sessions.truncate(max_sessions);
        }

        Self {
            storage,
            sessions,
            max_sessions,
        }
    }

    fn read_sessions(storage: &dyn LocalStorage) -> std::result::Result<Vec<Session>, NitroError> {
        let raw = storage.get(CHATS_KEY).map_err(|e| NitroError::CorruptState {
            key: CHATS_KEY.to_string(),
            message: e.to_string(),
        })?;

        match raw {
            None => Ok(Vec::new()),
            Some(text) => serde_json::from_str(&text).map_err(|e| NitroError::CorruptState {
                key: CHATS_KEY.to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// Allocate an id for a new conversation
    ///
    /// Nothing is stored until the first message is appended under it.
    pub fn start_session(&self) -> SessionId {
        Uuid::new_v4().to_string()
    }

    /// Record a user message and the assistant's reply
    ///
    /// With `None`, or an id not yet in the store, a new session titled
    /// with the first [`TITLE_MAX_CHARS`] characters of `user_message` is
    /// created at the head. With an existing id both messages are appended
    /// and the session moves to the head.
    ///
    /// # Returns
    ///
    /// The id of the session the exchange was recorded in
    ///
    /// # Errors
    ///
    /// Returns error if the updated list cannot be written to storage; the
    /// in-memory store keeps the exchange either way.
    pub fn append_exchange(
        &mut self,
        session_id: Option<&str>,
        user_message: &str,
        assistant_message: &str,
    ) -> Result<SessionId> {
        self.append_messages(
            session_id,
            vec![
                Message::user(user_message),
                Message::assistant(assistant_message),
            ],
        )
    }

    /// Record a single message
    ///
    /// Used by flows that do not produce a user/assistant pair (voice
    /// transcription, search). Creation and ordering rules match
    /// [`SessionStore::append_exchange`].
    pub fn append_message(
        &mut self,
        session_id: Option<&str>,
        message: Message,
    ) -> Result<SessionId> {
        self.append_messages(session_id, vec![message])
    }

    fn append_messages(
        &mut self,
        session_id: Option<&str>,
        messages: Vec<Message>,
    ) -> Result<SessionId> {
        let position = session_id.and_then(|id| self.sessions.iter().position(|s| s.id == id));

        let id = match position {
            Some(index) => {
                let mut session = self.sessions.remove(index);
                session.messages.extend(messages);
                let id = session.id.clone();
                self.sessions.insert(0, session);
                id
            }
            None => {
                let id = session_id
                    .map(str::to_string)
                    .unwrap_or_else(|| self.start_session());
                let title = derive_title(&messages);
                tracing::info!(session_id = %id, "Created chat session");
                self.sessions.insert(
                    0,
                    Session {
                        id: id.clone(),
                        title,
                        messages,
                    },
                );
                id
            }
        };

        self.evict();
        self.persist()?;
        Ok(id)
    }

    /// Summaries of every session, most recently active first
    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        self.sessions.iter().map(Session::summary).collect()
    }

    /// Full session by id
    ///
    /// # Errors
    ///
    /// Returns [`NitroError::NotFound`] if no session has this id
    pub fn load_session(&self, session_id: &str) -> Result<&Session> {
        self.sessions
            .iter()
            .find(|s| s.id == session_id)
            .ok_or_else(|| NitroError::NotFound(session_id.to_string()).into())
    }

    /// Every session, most recently active first
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Drop every session and persist the empty list
    pub fn clear(&mut self) -> Result<()> {
        self.sessions.clear();
        self.persist()
    }

    /// Number of stored sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the store holds no sessions
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Maximum number of sessions kept
    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    fn evict(&mut self) {
        if self.sessions.len() > self.max_sessions {
            for evicted in &self.sessions[self.max_sessions..] {
                tracing::debug!(session_id = %evicted.id, "Evicting oldest chat session");
            }
            self.sessions.truncate(self.max_sessions);
        }
    }

    fn persist(&self) -> Result<()> {
        let serialized = serde_json::to_string(&self.sessions).map_err(NitroError::Serialization)?;
        self.storage.set(CHATS_KEY, &serialized)
    }
}

/// Title from the first user message, cut at [`TITLE_MAX_CHARS`] characters
fn derive_title(messages: &[Message]) -> String {
    messages
        .iter()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .filter(|content| !content.is_empty())
        .map(|content| content.chars().take(TITLE_MAX_CHARS).collect())
        .unwrap_or_else(|| UNTITLED_SESSION.to_string())
}
