// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the complete ragchat service.
//!
//! Each test wires the real adapters from configuration: SQLite in a temp
//! directory, Gemini and Weaviate served by wiremock. Requests go through
//! the gateway router.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use ragchat::app::{App, build_app};
use ragchat_config::RagchatConfig;
use ragchat_core::StorageAdapter;
use ragchat_core::types::Role;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestHarness {
    app: App,
    router: Router,
    gemini: MockServer,
    weaviate: MockServer,
    _dir: tempfile::TempDir,
}

impl TestHarness {
    async fn start() -> Self {
        let gemini = MockServer::start().await;
        let weaviate = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        let mut config = RagchatConfig::default();
        config.gemini.api_key = Some("test-key".into());
        config.gemini.base_url = gemini.uri();
        config.weaviate.scheme = "http".into();
        config.weaviate.host = Some(weaviate.uri().trim_start_matches("http://").to_string());
        config.storage.database_path = dir.path().join("ragchat.db").display().to_string();
        config.auth.require_login = false;

        Mock::given(method("POST"))
            .and(path("/models/embedding-001:embedContent"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "embedding": { "values": [0.6, 0.8] } })),
            )
            .mount(&gemini)
            .await;

        let app = build_app(&config, None).await.unwrap();
        let router = ragchat_gateway::build_router(app.state.clone());
        Self {
            app,
            router,
            gemini,
            weaviate,
            _dir: dir,
        }
    }

    async fn stream_fragments(&self, fragments: &[&str]) {
        let body: String = fragments
            .iter()
            .map(|f| {
                let chunk = json!({ "candidates": [{ "content": { "role": "model", "parts": [{ "text": f }] } }] });
                format!("data: {chunk}\n\n")
            })
            .collect();
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:streamGenerateContent"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .mount(&self.gemini)
            .await;
    }

    async fn weaviate_returns(&self, body: Value) {
        Mock::given(method("POST"))
            .and(path("/v1/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.weaviate)
            .await;
    }

    async fn chat(&self, question: &str) -> Vec<(String, Value)> {
        let request = Request::post("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "history": [{ "role": "user", "content": question }] }).to_string(),
            ))
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        parse_sse(&String::from_utf8(bytes.to_vec()).unwrap())
    }
}

fn parse_sse(body: &str) -> Vec<(String, Value)> {
    body.split("\n\n")
        .filter_map(|block| {
            let name = block.lines().find_map(|l| l.strip_prefix("event:"))?;
            let data = block.lines().find_map(|l| l.strip_prefix("data:"))?;
            Some((name.trim().to_string(), serde_json::from_str(data.trim()).ok()?))
        })
        .collect()
}

fn deltas(events: &[(String, Value)]) -> Vec<String> {
    events
        .iter()
        .filter(|(name, _)| name == "text_delta")
        .map(|(_, data)| data["content"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn streamed_answer_grows_and_both_messages_are_stored() {
    let h = TestHarness::start().await;
    h.weaviate_returns(json!({
        "data": { "Get": { "Document": [
            { "text": "Greetings open a conversation.", "_additional": { "certainty": 0.91 } }
        ] } }
    }))
    .await;
    h.stream_fragments(&["Hel", "lo"]).await;

    let events = h.chat("Say hello").await;
    assert_eq!(deltas(&events), vec!["Hel", "Hello"]);
    let (name, stop) = events.last().unwrap();
    assert_eq!(name, "message_stop");
    assert_eq!(stop, &json!({ "content": "Hello", "state": "complete" }));

    // The prompt sent to the model carries the retrieved chunk.
    let requests = h.gemini.received_requests().await.unwrap();
    let stream_call = requests
        .iter()
        .find(|r| r.url.path().ends_with(":streamGenerateContent"))
        .unwrap();
    let sent = String::from_utf8_lossy(&stream_call.body);
    assert!(sent.contains("Greetings open a conversation."));

    let TestHarness { app, .. } = h;
    ragchat_pipeline::shutdown::drain_outbox(app.outbox, std::time::Duration::from_secs(5))
        .await
        .unwrap();
    let stored = app.storage.recent_messages(10).await.unwrap();
    let pairs: Vec<_> = stored.iter().map(|m| (m.role, m.content.as_str())).collect();
    assert_eq!(pairs, vec![(Role::User, "Say hello"), (Role::Assistant, "Hello")]);
}

#[tokio::test]
async fn vector_store_error_still_answers() {
    let h = TestHarness::start().await;
    h.weaviate_returns(json!({ "errors": [{ "message": "class Document not found" }] }))
        .await;
    h.stream_fragments(&["No context, ", "but here is an answer."]).await;

    let events = h.chat("What is in the knowledge base?").await;
    let (_, stop) = events.last().unwrap();
    assert_eq!(stop["state"], "complete");
    assert_eq!(stop["content"], "No context, but here is an answer.");
}

#[tokio::test]
async fn model_error_yields_fallback() {
    let h = TestHarness::start().await;
    h.weaviate_returns(json!({ "data": { "Get": { "Document": [] } } })).await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:streamGenerateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" }
        })))
        .mount(&h.gemini)
        .await;

    let events = h.chat("hi").await;
    assert!(deltas(&events).is_empty());
    let (name, stop) = events.last().unwrap();
    assert_eq!(name, "message_stop");
    assert_eq!(stop["state"], "failed");
    assert_eq!(stop["content"], ragchat_pipeline::FALLBACK_MESSAGE);
}

#[tokio::test]
async fn upsert_then_search_messages() {
    let h = TestHarness::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/objects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "x" })))
        .expect(1)
        .mount(&h.weaviate)
        .await;

    let request = Request::post("/api/upsert")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "chunks": ["Rust has no garbage collector."] }).to_string()))
        .unwrap();
    let response = h.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::post("/api/save-message")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "role": "user", "content": "Tell me about Rust" }).to_string()))
        .unwrap();
    let response = h.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::get("/api/messages?q=rust").body(Body::empty()).unwrap();
    let response = h.router.clone().oneshot(request).await.unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["messages"][0]["content"], "Tell me about Rust");
}
