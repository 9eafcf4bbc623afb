// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use ragchat_auth::CredentialService;
use ragchat_core::RagchatError;
use ragchat_core::traits::{EmbeddingAdapter, ProviderAdapter, StorageAdapter, VectorStoreAdapter};
use ragchat_pipeline::ChatPipeline;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_session;
use crate::handlers;
use crate::sse;

/// Health state for unauthenticated health/metrics endpoints.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
    /// Optional Prometheus metrics render function.
    pub prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

/// Request-independent knobs read from configuration.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Vector store class written by `/api/upsert`.
    pub class_name: String,
    /// Characters per chunk for raw-text ingestion.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks.
    pub chunk_overlap: usize,
    /// Reject protected routes without a valid session token.
    pub require_login: bool,
}

/// Shared state for axum request handlers.
///
/// Built once at startup; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: ChatPipeline,
    pub provider: Arc<dyn ProviderAdapter>,
    pub embedder: Arc<dyn EmbeddingAdapter>,
    pub vector_store: Arc<dyn VectorStoreAdapter>,
    pub storage: Arc<dyn StorageAdapter>,
    pub credentials: Arc<CredentialService>,
    pub settings: GatewaySettings,
    pub health: HealthState,
}

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    // Unauthenticated public routes.
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/metrics", get(handlers::get_metrics))
        .route("/api/register", post(handlers::post_register))
        .route("/api/login", post(handlers::post_login))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/api/chat", post(sse::post_chat))
        .route("/api/rag", post(handlers::post_rag))
        .route("/api/save-message", post(handlers::post_save_message))
        .route("/api/upsert", post(handlers::post_upsert))
        .route("/api/messages", get(handlers::get_messages))
        .route("/api/logout", post(handlers::post_logout))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serves the gateway on `host:port` until `shutdown` is cancelled.
pub async fn start_server(
    host: &str,
    port: u16,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), RagchatError> {
    let app = build_router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RagchatError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| RagchatError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_debug_lists_fields() {
        let settings = GatewaySettings {
            class_name: "Document".to_string(),
            chunk_size: 1000,
            chunk_overlap: 200,
            require_login: true,
        };
        let debug = format!("{settings:?}");
        assert!(debug.contains("Document"));
        assert!(debug.contains("require_login: true"));
    }

    #[test]
    fn health_state_is_clone() {
        let health = HealthState {
            start_time: std::time::Instant::now(),
            prometheus_render: Some(Arc::new(|| "up 1".to_string())),
        };
        let cloned = health.clone();
        let render = cloned.prometheus_render.unwrap();
        assert_eq!(render(), "up 1");
    }
}
