//! Request and response shapes of the Nitro backend
//!
//! Only the fields the client depends on are modelled; unknown fields are
//! ignored when decoding.

use serde::{Deserialize, Serialize};

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    /// User message text
    pub message: String,
    /// Caller identity forwarded to the backend
    pub user_id: String,
    /// Backend conversation id, if one was returned earlier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Reply of `POST /chat`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatResponse {
    /// Assistant reply text
    #[serde(default)]
    pub response: String,
    /// Backend conversation id
    #[serde(default)]
    pub session_id: Option<String>,
    /// Model that produced the reply
    #[serde(default)]
    pub ai_model: Option<String>,
    /// Where the reply came from (local model, cloud, fallback)
    #[serde(default)]
    pub ai_source: Option<String>,
    /// Structured application error code, if the backend reports one
    #[serde(default)]
    pub error_code: Option<String>,
}

/// Reply of `GET /health`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthResponse {
    /// Health status, `healthy` when the backend is up
    pub status: String,
    /// Server time
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Server version
    #[serde(default)]
    pub version: Option<String>,
}

impl HealthResponse {
    /// Whether the backend reports itself healthy
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy") || self.status.eq_ignore_ascii_case("ok")
    }
}

/// One entry of `GET /sessions/recent`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteSession {
    /// Backend session id
    pub session_id: String,
    /// Session title
    #[serde(default)]
    pub title: Option<String>,
    /// Number of stored messages
    #[serde(default)]
    pub message_count: u64,
    /// Time of the last message
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Reply of `GET /sessions/recent`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecentSessionsResponse {
    /// Sessions, most recent first
    #[serde(default)]
    pub sessions: Vec<RemoteSession>,
}

/// One entry of `GET /history/{session_id}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryEntry {
    /// Author of the entry
    #[serde(default)]
    pub sender: Option<String>,
    /// User message text
    #[serde(default)]
    pub message: Option<String>,
    /// Assistant reply text
    #[serde(default)]
    pub response: Option<String>,
}

/// Reply of `GET /history/{session_id}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryResponse {
    /// Entries in chronological order
    #[serde(default)]
    pub messages: Vec<HistoryEntry>,
}

/// Counters inside `GET /stats`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Statistics {
    /// Sessions known to the backend
    #[serde(default)]
    pub total_sessions: u64,
    /// Messages known to the backend
    #[serde(default)]
    pub total_messages: u64,
}

/// Reply of `GET /stats`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatsResponse {
    /// Usage counters
    #[serde(default)]
    pub statistics: Statistics,
}

/// Body of `POST /image/generate`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRequest {
    /// Description of the desired image
    pub prompt: String,
    /// What to avoid in the image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    /// Image size such as `512x512`
    pub size: String,
    /// `standard` or `hd`
    pub quality: String,
}

impl ImageRequest {
    /// A standard-quality 512x512 request
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: None,
            size: "512x512".to_string(),
            quality: "standard".to_string(),
        }
    }
}

/// Body of `POST /voice/speech-to-text`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpeechToTextRequest {
    /// Audio file path on the backend host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_file: Option<String>,
    /// Record from the backend host's microphone instead
    pub use_microphone: bool,
}

/// Body of `POST /voice/text-to-speech`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextToSpeechRequest {
    /// Text to speak
    pub text: String,
    /// Language code
    pub language: String,
    /// Optional output path on the backend host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_file: Option<String>,
}

/// Body of `POST /search`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    /// Search query
    pub query: String,
    /// Ask the backend to summarize the results
    pub summarize: bool,
}

/// Body of `POST /video/generate`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoRequest {
    /// Description of the video
    pub prompt: String,
    /// Duration in seconds
    pub duration: u32,
    /// Visual style
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Resolution such as `1280x720`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_omits_missing_session() {
        let request = ChatRequest {
            message: "hi".to_string(),
            user_id: "anonymous".to_string(),
            session_id: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"message": "hi", "user_id": "anonymous"})
        );
    }

    #[test]
    fn test_chat_response_tolerates_extra_and_missing_fields() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"response":"hello","timestamp":"now","status":"success","ai_model":"phi3"}"#,
        )
        .unwrap();
        assert_eq!(response.response, "hello");
        assert_eq!(response.ai_model.as_deref(), Some("phi3"));
        assert!(response.session_id.is_none());
        assert!(response.error_code.is_none());
    }

    #[test]
    fn test_history_entries_with_partial_fields() {
        let history: HistoryResponse = serde_json::from_str(
            r#"{"session_id":"s","messages":[{"sender":"user","message":"hi"},{"response":"hello"}]}"#,
        )
        .unwrap();
        assert_eq!(history.messages.len(), 2);
        assert_eq!(history.messages[0].message.as_deref(), Some("hi"));
        assert!(history.messages[1].sender.is_none());
    }

    #[test]
    fn test_stats_response_defaults() {
        let stats: StatsResponse =
            serde_json::from_str(r#"{"statistics":{"total_sessions":3}}"#).unwrap();
        assert_eq!(stats.statistics.total_sessions, 3);
        assert_eq!(stats.statistics.total_messages, 0);
    }

    #[test]
    fn test_health_status_check() {
        let health: HealthResponse = serde_json::from_str(r#"{"status":"healthy"}"#).unwrap();
        assert!(health.is_healthy());
        let health: HealthResponse = serde_json::from_str(r#"{"status":"degraded"}"#).unwrap();
        assert!(!health.is_healthy());
    }
}
