//! Typed client for the Nitro backend
//!
//! Every endpoint goes through the [`ResilientClient`]: transport failures
//! are retried there, non-2xx responses become
//! [`NitroError::HttpStatus`], and chat replies are checked for
//! application-level errors before they reach the caller.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::{RequestOptions, RequestPolicy, ResilientClient, WakeSignal};
use crate::config::Config;
use crate::error::{NitroError, Result};

pub mod diagnostics;
pub mod types;

use diagnostics::ResponseInspector;
pub use types::{
    ChatRequest, ChatResponse, HealthResponse, HistoryEntry, HistoryResponse, ImageRequest,
    RecentSessionsResponse, RemoteSession, SearchRequest, SpeechToTextRequest, Statistics,
    StatsResponse, TextToSpeechRequest, VideoRequest,
};

/// Header carrying the optional backend API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Typed wrapper over the backend endpoints
#[derive(Debug, Clone)]
pub struct NitroApi {
    client: ResilientClient,
    policy: RequestPolicy,
    health_policy: RequestPolicy,
    inspector: ResponseInspector,
}

impl NitroApi {
    /// Create an API wrapper using `policy` for every call except `/health`
    ///
    /// Health checks are probes: they get a single attempt with the same
    /// timeout so a sleeping backend is reported instead of waited on.
    pub fn new(client: ResilientClient, policy: RequestPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self {
            client,
            policy,
            health_policy: RequestPolicy::new(0, policy.timeout).with_backoff(Duration::ZERO),
            inspector: ResponseInspector::new()?,
        })
    }

    /// Build the API wrapper described by `config`, over reqwest
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut client = ResilientClient::with_reqwest(&config.api.base_url)?;
        if let Some(key) = config.api.api_key.as_deref().filter(|k| !k.is_empty()) {
            client = client.with_default_header(API_KEY_HEADER, key);
        }
        Self::new(client, config.request.policy())
    }

    /// Underlying resilient client
    pub fn client(&self) -> &ResilientClient {
        &self.client
    }

    /// Register a wake signal on the underlying client
    pub fn with_wake_signal(mut self, signal: Arc<dyn WakeSignal>) -> Self {
        self.client = self.client.with_wake_signal(signal);
        self
    }

    /// Retry policy used for regular calls
    pub fn policy(&self) -> &RequestPolicy {
        &self.policy
    }

    /// Send a chat message
    ///
    /// # Errors
    ///
    /// Transport errors after retries, [`NitroError::HttpStatus`] for
    /// non-2xx replies, and [`NitroError::Application`] when the reply
    /// reports a backend misconfiguration.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response: ChatResponse = self.post("/chat", request).await?;

        if let Some(app_error) = self
            .inspector
            .inspect(&response.response, response.error_code.as_deref())
        {
            tracing::warn!(kind = ?app_error.kind, "Backend reported an application error");
            return Err(NitroError::Application(app_error).into());
        }

        Ok(response)
    }

    /// Probe backend health (single attempt)
    pub async fn health(&self) -> Result<HealthResponse> {
        self.call_json("/health", &RequestOptions::get(), &self.health_policy)
            .await
    }

    /// Recent sessions stored on the backend
    pub async fn recent_sessions(&self, limit: usize) -> Result<RecentSessionsResponse> {
        self.get(&format!("/sessions/recent?limit={}", limit)).await
    }

    /// Message history of a backend session
    pub async fn history(&self, session_id: &str) -> Result<HistoryResponse> {
        let encoded: String = url::form_urlencoded::byte_serialize(session_id.as_bytes()).collect();
        self.get(&format!("/history/{}", encoded)).await
    }

    /// Backend usage statistics
    pub async fn stats(&self) -> Result<StatsResponse> {
        self.get("/stats").await
    }

    /// Generate an image from a prompt
    pub async fn generate_image(&self, request: &ImageRequest) -> Result<serde_json::Value> {
        self.post("/image/generate", request).await
    }

    /// Recently generated images
    pub async fn image_gallery(&self, limit: usize) -> Result<serde_json::Value> {
        self.get(&format!("/image/gallery?limit={}", limit)).await
    }

    /// Transcribe audio on the backend host
    pub async fn speech_to_text(&self, request: &SpeechToTextRequest) -> Result<serde_json::Value> {
        self.post("/voice/speech-to-text", request).await
    }

    /// Synthesize speech on the backend host
    pub async fn text_to_speech(&self, request: &TextToSpeechRequest) -> Result<serde_json::Value> {
        self.post("/voice/text-to-speech", request).await
    }

    /// Web search with optional AI summary
    pub async fn search(&self, request: &SearchRequest) -> Result<serde_json::Value> {
        self.post("/search", request).await
    }

    /// Request a video (the backend currently answers with a placeholder)
    pub async fn generate_video(&self, request: &VideoRequest) -> Result<serde_json::Value> {
        self.post("/video/generate", request).await
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.call_json(endpoint, &RequestOptions::get(), &self.policy)
            .await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, endpoint: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body).map_err(NitroError::Serialization)?;
        self.call_json(endpoint, &RequestOptions::post_json(body), &self.policy)
            .await
    }

    async fn call_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: &RequestOptions,
        policy: &RequestPolicy,
    ) -> Result<T> {
        self.client
            .call(endpoint, options, policy)
            .await?
            .error_for_status(endpoint)?
            .json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{FakeStep, FakeTransport};
    use crate::client::Method;

    fn api_with(transport: Arc<FakeTransport>, retries: u32) -> NitroApi {
        let client = ResilientClient::new("http://backend.test", transport).unwrap();
        NitroApi::new(client, RequestPolicy::new(retries, Duration::from_secs(1))).unwrap()
    }

    fn nitro_error(err: &anyhow::Error) -> &NitroError {
        err.downcast_ref::<NitroError>().expect("NitroError")
    }

    #[test]
    fn test_zero_timeout_policy_is_rejected() {
        let transport = Arc::new(FakeTransport::always(FakeStep::respond(200, "{}")));
        let client = ResilientClient::new("http://backend.test", transport).unwrap();
        let result = NitroApi::new(client, RequestPolicy::new(1, Duration::ZERO));
        assert!(matches!(
            result.err().and_then(|e| e.downcast::<NitroError>().ok()),
            Some(NitroError::Config(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_posts_request_body() {
        let transport = Arc::new(FakeTransport::always(FakeStep::respond(
            200,
            r#"{"response":"hello","session_id":"remote-1","ai_model":"phi3"}"#,
        )));
        let api = api_with(transport.clone(), 0);

        let reply = api
            .chat(&ChatRequest {
                message: "hi".to_string(),
                user_id: "anonymous".to_string(),
                session_id: Some("remote-0".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(reply.response, "hello");
        assert_eq!(reply.session_id.as_deref(), Some("remote-1"));

        let (url, options) = transport.requests().remove(0);
        assert_eq!(url, "http://backend.test/chat");
        assert_eq!(options.method, Method::Post);
        assert_eq!(
            options.body,
            Some(serde_json::json!({
                "message": "hi",
                "user_id": "anonymous",
                "session_id": "remote-0"
            }))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_application_error_is_not_retried() {
        let transport = Arc::new(FakeTransport::always(FakeStep::respond(
            200,
            r#"{"response":"Gemini error: GEMINI_API_KEY not configured in .env"}"#,
        )));
        let api = api_with(transport.clone(), 3);

        let err = api
            .chat(&ChatRequest {
                message: "hi".to_string(),
                user_id: "u".to_string(),
                session_id: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(nitro_error(&err), NitroError::Application(_)));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_success_status_becomes_http_error() {
        let transport = Arc::new(FakeTransport::always(FakeStep::respond(
            404,
            r#"{"detail":"Session not found"}"#,
        )));
        let api = api_with(transport.clone(), 2);

        let err = api.history("missing").await.unwrap_err();
        match nitro_error(&err) {
            NitroError::HttpStatus { status, endpoint, .. } => {
                assert_eq!(*status, 404);
                assert_eq!(endpoint, "/history/missing");
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_makes_a_single_attempt() {
        let transport = Arc::new(FakeTransport::always(FakeStep::fail("refused")));
        let api = api_with(transport.clone(), 4);

        let err = api.health().await.unwrap_err();
        assert!(nitro_error(&err).is_transport());
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_id_is_encoded() {
        let transport = Arc::new(FakeTransport::always(FakeStep::respond(
            200,
            r#"{"messages":[]}"#,
        )));
        let api = api_with(transport.clone(), 0);

        api.history("a/b c").await.unwrap();
        let (url, _) = transport.requests().remove(0);
        assert_eq!(url, "http://backend.test/history/a%2Fb+c");
    }

    #[tokio::test(start_paused = true)]
    async fn test_recent_sessions_and_stats_decode() {
        let transport = Arc::new(FakeTransport::new(vec![
            FakeStep::respond(
                200,
                r#"{"sessions":[{"session_id":"s1","title":"t","message_count":4,"last_updated":"2024-01-01T00:00:00"}],"count":1}"#,
            ),
            FakeStep::respond(200, r#"{"statistics":{"total_sessions":7,"total_messages":40}}"#),
        ]));
        let api = api_with(transport.clone(), 0);

        let recent = api.recent_sessions(5).await.unwrap();
        assert_eq!(recent.sessions[0].session_id, "s1");
        assert_eq!(recent.sessions[0].message_count, 4);

        let stats = api.stats().await.unwrap();
        assert_eq!(stats.statistics.total_messages, 40);

        let urls: Vec<String> = transport.requests().into_iter().map(|(u, _)| u).collect();
        assert_eq!(
            urls,
            vec![
                "http://backend.test/sessions/recent?limit=5".to_string(),
                "http://backend.test/stats".to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_feature_endpoints_return_opaque_json() {
        let transport = Arc::new(FakeTransport::always(FakeStep::respond(
            200,
            r#"{"status":"placeholder","video_id":"v1"}"#,
        )));
        let api = api_with(transport.clone(), 0);

        let video = api
            .generate_video(&VideoRequest {
                prompt: "sunset".to_string(),
                duration: 4,
                style: None,
                resolution: None,
            })
            .await
            .unwrap();
        assert_eq!(video["status"], "placeholder");

        let search = api
            .search(&SearchRequest {
                query: "rust".to_string(),
                summarize: true,
            })
            .await
            .unwrap();
        assert_eq!(search["video_id"], "v1");

        let endpoints: Vec<String> = transport.requests().into_iter().map(|(u, _)| u).collect();
        assert_eq!(
            endpoints,
            vec![
                "http://backend.test/video/generate".to_string(),
                "http://backend.test/search".to_string(),
            ]
        );
    }

    #[test]
    fn test_from_config_uses_configured_base_url_and_policy() {
        let mut config = Config::default();
        config.api.api_key = Some("secret".to_string());
        let api = NitroApi::from_config(&config).unwrap();
        assert_eq!(api.client().base_url(), "http://localhost:8000/");
        assert_eq!(api.policy().retries, 2);
    }
}
