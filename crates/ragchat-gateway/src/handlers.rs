// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! The chat route lives in [`crate::sse`]; everything else is here.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use ragchat_auth::AuthError;
use ragchat_context::chunk_text;
use ragchat_core::RagchatError;
use ragchat_core::types::{DocumentChunk, HealthStatus, Role, StoredMessage};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};

use crate::auth::bearer_token;
use crate::server::AppState;

/// Upper bound for `GET /api/messages?limit=`.
pub const MAX_MESSAGE_LIMIT: usize = 100;
const DEFAULT_MESSAGE_LIMIT: usize = 20;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// Request body for POST /api/rag.
#[derive(Debug, Deserialize)]
pub struct RagRequest {
    #[serde(default)]
    pub question: String,
}

/// Request body for POST /api/save-message.
#[derive(Debug, Deserialize)]
pub struct SaveMessageRequest {
    pub role: Role,
    pub content: String,
}

/// Request body for POST /api/register and POST /api/login.
#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for POST /api/upsert.
///
/// `chunks` are stored as given; `text` is split server side first.
#[derive(Debug, Default, Deserialize)]
pub struct UpsertRequest {
    #[serde(default)]
    pub chunks: Vec<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Query string for GET /api/messages.
#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    /// Substring to search for. Omitted or blank lists the latest messages.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Response body for GET /api/messages.
#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<StoredMessage>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when every adapter is healthy, otherwise `degraded`.
    pub status: String,
    /// Binary version.
    pub version: String,
    pub uptime_secs: u64,
    /// Adapter name to its health.
    pub adapters: BTreeMap<String, String>,
}

fn failure(status: StatusCode, body: serde_json::Value) -> Response {
    (status, Json(body)).into_response()
}

/// POST /api/rag
///
/// Returns the knowledge-base chunks nearest to `question`. A failing vector
/// store gives an empty context; an embedding failure is reported as 500.
pub async fn post_rag(State(state): State<AppState>, Json(body): Json<RagRequest>) -> Response {
    let question = body.question.trim();
    if question.is_empty() {
        return failure(
            StatusCode::BAD_REQUEST,
            json!({ "context": [], "error": "No question provided" }),
        );
    }

    match state.pipeline.assembler().retriever().try_retrieve(question).await {
        Ok(context) => Json(json!({ "context": context })).into_response(),
        Err(e) => {
            error!(error = %e, "question embedding failed");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "context": [], "error": e.to_string() }),
            )
        }
    }
}

/// POST /api/save-message
///
/// Writes one message synchronously, bypassing the outbox.
pub async fn post_save_message(
    State(state): State<AppState>,
    Json(body): Json<SaveMessageRequest>,
) -> Response {
    match state.storage.insert_message(body.role, &body.content).await {
        Ok(_) => Json(json!({ "success": true })).into_response(),
        Err(e) => {
            error!(error = %e, "failed to save message");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "success": false, "error": e.to_string() }),
            )
        }
    }
}

fn auth_failure(e: AuthError) -> Response {
    let status = match &e {
        AuthError::MissingField(_) => StatusCode::BAD_REQUEST,
        AuthError::EmailTaken => StatusCode::CONFLICT,
        AuthError::UserNotFound | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::Hash(_) | AuthError::Storage(_) => {
            error!(error = %e, "account operation failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    failure(status, json!({ "success": false, "error": e.to_string() }))
}

/// POST /api/register
pub async fn post_register(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Response {
    let password = SecretString::from(body.password);
    match state.credentials.register(&body.email, password).await {
        Ok(_) => Json(json!({ "success": true })).into_response(),
        Err(e) => auth_failure(e),
    }
}

/// POST /api/login
///
/// Returns a bearer token for the protected routes.
pub async fn post_login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Response {
    let password = SecretString::from(body.password);
    match state.credentials.login(&body.email, password).await {
        Ok(token) => Json(json!({ "success": true, "token": token })).into_response(),
        Err(e) => auth_failure(e),
    }
}

/// POST /api/logout
pub async fn post_logout(State(state): State<AppState>, headers: HeaderMap) -> Json<serde_json::Value> {
    let revoked = bearer_token(&headers)
        .map(|token| state.credentials.sessions().revoke(token))
        .unwrap_or(false);
    Json(json!({ "success": revoked }))
}

/// POST /api/upsert
///
/// Embeds each chunk and writes it to the vector store, stopping at the
/// first failure. `inserted` counts the chunks written before it.
pub async fn post_upsert(
    State(state): State<AppState>,
    Json(body): Json<UpsertRequest>,
) -> Response {
    let mut chunks: Vec<String> = body
        .chunks
        .into_iter()
        .filter(|c| !c.trim().is_empty())
        .collect();
    if let Some(text) = body.text.as_deref() {
        chunks.extend(chunk_text(
            text,
            state.settings.chunk_size,
            state.settings.chunk_overlap,
        ));
    }
    if chunks.is_empty() {
        return failure(
            StatusCode::BAD_REQUEST,
            json!({ "success": false, "inserted": 0, "error": "no chunks provided" }),
        );
    }

    let class_name = &state.settings.class_name;
    let mut inserted = 0usize;
    for text in chunks {
        if let Err(e) = store_chunk(&state, text).await {
            error!(error = %e, inserted, "knowledge-base upsert failed");
            return failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "success": false, "inserted": inserted, "error": e.to_string() }),
            );
        }
        inserted += 1;
    }

    info!(inserted, class = %class_name, "knowledge-base chunks stored");
    Json(json!({ "success": true, "inserted": inserted })).into_response()
}

async fn store_chunk(state: &AppState, text: String) -> Result<String, RagchatError> {
    let vector = state.embedder.embed(&text).await?;
    state
        .vector_store
        .upsert(DocumentChunk { text, vector }, &state.settings.class_name)
        .await
}

/// GET /api/messages
pub async fn get_messages(
    State(state): State<AppState>,
    Query(query): Query<MessagesQuery>,
) -> Response {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_MESSAGE_LIMIT)
        .clamp(1, MAX_MESSAGE_LIMIT);
    let search = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let result = match search {
        Some(q) => state.storage.search_messages(q, limit).await,
        None => state.storage.recent_messages(limit).await,
    };

    match result {
        Ok(messages) => Json(MessagesResponse { messages }).into_response(),
        Err(e) => {
            error!(error = %e, "message lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

fn describe(result: Result<HealthStatus, RagchatError>) -> (bool, String) {
    match result {
        Ok(HealthStatus::Healthy) => (true, "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (false, format!("degraded: {reason}")),
        Ok(HealthStatus::Unhealthy(reason)) => (false, format!("unhealthy: {reason}")),
        Err(e) => (false, format!("unhealthy: {e}")),
    }
}

/// GET /health
///
/// Always 200 so liveness probes pass while an upstream is degraded; the
/// body says which adapter is at fault.
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (provider, embedder, vector_store, storage) = tokio::join!(
        state.provider.health_check(),
        state.embedder.health_check(),
        state.vector_store.health_check(),
        state.storage.health_check(),
    );

    let mut adapters = BTreeMap::new();
    let mut all_healthy = true;
    for (name, result) in [
        (state.provider.name(), provider),
        (state.embedder.name(), embedder),
        (state.vector_store.name(), vector_store),
        (state.storage.name(), storage),
    ] {
        let (healthy, label) = describe(result);
        if !healthy {
            warn!(adapter = name, status = %label, "adapter not healthy");
        }
        all_healthy &= healthy;
        adapters.insert(name.to_string(), label);
    }

    Json(HealthResponse {
        status: if all_healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
        adapters,
    })
}

/// GET /metrics
pub async fn get_metrics(State(state): State<AppState>) -> Response {
    match &state.health.prometheus_render {
        Some(render) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "metrics are disabled".to_string(),
            }),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_request_accepts_either_field() {
        let req: UpsertRequest = serde_json::from_str(r#"{"chunks":["a","b"]}"#).unwrap();
        assert_eq!(req.chunks, vec!["a", "b"]);
        assert!(req.text.is_none());

        let req: UpsertRequest = serde_json::from_str(r#"{"text":"raw"}"#).unwrap();
        assert!(req.chunks.is_empty());
        assert_eq!(req.text.as_deref(), Some("raw"));
    }

    #[test]
    fn save_message_rejects_unknown_role() {
        let ok: Result<SaveMessageRequest, _> =
            serde_json::from_str(r#"{"role":"assistant","content":"hi"}"#);
        assert!(ok.is_ok());

        let bad: Result<SaveMessageRequest, _> =
            serde_json::from_str(r#"{"role":"system","content":"hi"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn health_labels() {
        assert_eq!(describe(Ok(HealthStatus::Healthy)), (true, "healthy".to_string()));
        assert_eq!(
            describe(Ok(HealthStatus::Degraded("slow".into()))),
            (false, "degraded: slow".to_string())
        );
        let (healthy, label) = describe(Err(RagchatError::Internal("boom".into())));
        assert!(!healthy);
        assert!(label.contains("boom"));
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            uptime_secs: 42,
            adapters: BTreeMap::from([("sqlite".to_string(), "healthy".to_string())]),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["uptime_secs"], 42);
        assert_eq!(json["adapters"]["sqlite"], "healthy");
    }
}
