//! Backend API and application state integration tests
//!
//! Drives `NitroApi` and `AppState` over reqwest against a `wiremock` mock
//! server, with chat history persisted to a temporary SQLite file.

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{create_temp_storage, CountingSignal};
use nitro::api::diagnostics::ApplicationErrorKind;
use nitro::api::{ChatRequest, NitroApi, SearchRequest};
use nitro::storage::SessionStore;
use nitro::{AppState, Config, NitroError, WakeSignal};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.api.user_id = "tester".to_string();
    config.request.retries = 1;
    config.request.timeout_ms = 500;
    config.request.backoff_ms = 10;
    config
}

fn chat_request(message: &str) -> ChatRequest {
    ChatRequest {
        message: message.to_string(),
        user_id: "tester".to_string(),
        session_id: None,
    }
}

// ---------------------------------------------------------------------------
// NitroApi
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_chat_sends_api_key_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("X-API-Key", "secret"))
        .and(body_json(json!({"message": "hello", "user_id": "tester"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Hi!",
            "session_id": "remote-1",
            "ai_model": "phi3",
            "ai_source": "ollama_local"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.api.api_key = Some("secret".to_string());
    let api = NitroApi::from_config(&config).unwrap();

    let reply = api.chat(&chat_request("hello")).await.unwrap();
    assert_eq!(reply.response, "Hi!");
    assert_eq!(reply.session_id.as_deref(), Some("remote-1"));
    assert_eq!(reply.ai_source.as_deref(), Some("ollama_local"));
}

#[tokio::test]
async fn test_chat_structured_error_code_is_application_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Gemini is not available",
            "error_code": "provider_not_configured"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = NitroApi::from_config(&config_for(&server)).unwrap();
    let err = api.chat(&chat_request("hello")).await.unwrap_err();

    match err.downcast_ref::<NitroError>() {
        Some(NitroError::Application(app_error)) => {
            assert_eq!(app_error.kind, ApplicationErrorKind::MissingCredentials);
            assert!(app_error.instruction().contains(".env"));
        }
        other => panic!("expected Application error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_health_single_attempt_against_slow_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.request.retries = 3;
    config.request.timeout_ms = 100;
    let api = NitroApi::from_config(&config).unwrap();

    let err = api.health().await.unwrap_err();
    assert!(err.downcast_ref::<NitroError>().unwrap().is_transport());
}

#[tokio::test]
async fn test_recent_sessions_passes_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sessions/recent"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessions": [
                {"session_id": "a", "title": "First", "message_count": 2},
                {"session_id": "b", "message_count": 6}
            ],
            "count": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = NitroApi::from_config(&config_for(&server)).unwrap();
    let recent = api.recent_sessions(3).await.unwrap();
    assert_eq!(recent.sessions.len(), 2);
    assert_eq!(recent.sessions[1].title, None);
}

#[tokio::test]
async fn test_search_returns_backend_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_json(json!({"query": "rust", "summarize": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"title": "The Rust Programming Language"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = NitroApi::from_config(&config_for(&server)).unwrap();
    let value = api
        .search(&SearchRequest {
            query: "rust".to_string(),
            summarize: false,
        })
        .await
        .unwrap();
    assert_eq!(value["results"][0]["title"], "The Rust Programming Language");
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_conversation_is_persisted_across_restarts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Rust is a systems language.",
            "session_id": "remote-1"
        })))
        .mount(&server)
        .await;

    let (storage, _tmp) = create_temp_storage();
    let config = config_for(&server);

    let session_id = {
        let mut state = AppState::from_config_with_storage(&config, storage.clone(), None).unwrap();
        let first = state.send_message("What is Rust?").await.unwrap();
        let second = state.send_message("Tell me more").await.unwrap();
        assert_eq!(first.session_id, second.session_id);
        first.session_id
    };

    let store = SessionStore::load(storage);
    let session = store.load_session(&session_id).unwrap();
    assert_eq!(session.title, "What is Rust?");
    assert_eq!(session.messages.len(), 4);
    assert_eq!(session.messages[3].content, "Rust is a systems language.");
}

#[tokio::test]
async fn test_http_error_can_be_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(503).set_body_string("starting"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "ready"})))
        .expect(1)
        .mount(&server)
        .await;

    let (storage, _tmp) = create_temp_storage();
    let mut state = AppState::from_config_with_storage(&config_for(&server), storage, None).unwrap();

    let err = state.send_message("ping").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<NitroError>(),
        Some(NitroError::HttpStatus { status: 503, .. })
    ));
    assert_eq!(state.pending_retry(), Some("ping"));
    assert!(state.store().is_empty());

    let reply = state.retry_last().await.unwrap();
    assert_eq!(reply.text, "ready");
    assert!(state.pending_retry().is_none());
    assert_eq!(state.store().len(), 1);
}

#[tokio::test]
async fn test_wake_signal_raised_and_cleared() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "morning"})))
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.request.timeout_ms = 100;

    let signal = Arc::new(CountingSignal::default());
    let (storage, _tmp) = create_temp_storage();
    let mut state =
        AppState::from_config_with_storage(&config, storage, Some(signal.clone() as Arc<dyn WakeSignal>))
            .unwrap();

    let reply = state.send_message("wake up").await.unwrap();
    assert_eq!(reply.text, "morning");
    assert_eq!(signal.waking_count(), 1);
    assert_eq!(signal.awake_count(), 1);
}
