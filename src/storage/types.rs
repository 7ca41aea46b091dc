use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque session identifier
pub type SessionId = String;

/// Title used when a session has no user message to derive one from
pub const UNTITLED_SESSION: &str = "New conversation";

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person chatting
    User,
    /// The AI backend
    Assistant,
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Author of the message
    pub role: Role,
    /// Message text (may contain markdown)
    pub content: String,
    /// Creation time, serialized as RFC 3339
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a user message stamped with the current time
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create an assistant message stamped with the current time
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A titled, ordered conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for the session
    pub id: SessionId,
    /// Title derived from the first user message
    pub title: String,
    /// Messages in insertion order
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Session {
    /// Time of the newest message, if any
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.messages.last().map(|m| m.timestamp)
    }

    /// Summary view of this session
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            message_count: self.messages.len(),
            last_updated: self.last_updated(),
        }
    }
}

/// Metadata for a stored chat session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Unique identifier for the session
    pub id: SessionId,
    /// User-friendly title
    pub title: String,
    /// Number of messages in the session
    pub message_count: usize,
    /// When the newest message was added
    pub last_updated: Option<DateTime<Utc>>,
}
