// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Weaviate vector store adapter for ragchat.
//!
//! Queries go through the GraphQL `Get` endpoint with a `nearVector`
//! argument and fail closed: any transport, HTTP, parse or GraphQL error is
//! logged and yields no chunks. Ingestion creates objects through the REST
//! `objects` endpoint with a client-supplied vector and reports failures.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use ragchat_config::model::WeaviateConfig;
use ragchat_core::error::RagchatError;
use ragchat_core::traits::{PluginAdapter, VectorStoreAdapter};
use ragchat_core::types::{AdapterType, DocumentChunk, Embedding, HealthStatus};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::{debug, info, warn};

use crate::types::{CreateObject, GraphQlRequest, GraphQlResponse, Hit, ObjectProperties};

/// Weaviate-backed knowledge base.
#[derive(Debug, Clone)]
pub struct WeaviateStore {
    client: reqwest::Client,
    endpoint: String,
}

impl WeaviateStore {
    /// Builds a store from config. Requires `weaviate.host`.
    pub fn new(config: &WeaviateConfig) -> Result<Self, RagchatError> {
        let endpoint = config.endpoint().ok_or_else(|| {
            RagchatError::Config(
                "Weaviate host not found. Set weaviate.host in config or WEAVIATE_HOST environment variable.".into(),
            )
        })?;
        let store = Self::with_endpoint(
            &endpoint,
            config.api_key.as_deref(),
            Duration::from_secs(config.timeout_secs),
        )?;
        info!(endpoint = %store.endpoint, class = config.class_name, "Weaviate store initialized");
        Ok(store)
    }

    /// Builds a store talking to `endpoint` (scheme and host, no path).
    pub fn with_endpoint(
        endpoint: &str,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, RagchatError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
                    RagchatError::Config(format!("invalid Weaviate API key header value: {e}"))
                })?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| RagchatError::VectorStore {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    async fn try_query(
        &self,
        vector: &[f32],
        top_k: usize,
        class_name: &str,
    ) -> Result<Vec<String>, RagchatError> {
        check_vector(vector)?;
        let request = GraphQlRequest::near_vector(class_name, vector, top_k);
        let response = self.send_json("/v1/graphql", &request).await?;
        let parsed: GraphQlResponse =
            response.json().await.map_err(|e| RagchatError::VectorStore {
                message: format!("failed to parse GraphQL response: {e}"),
                source: Some(Box::new(e)),
            })?;
        let mut hits = hits_from_response(parsed, class_name)?;
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn send_json<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, RagchatError> {
        let response = self
            .client
            .post(format!("{}{path}", self.endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| RagchatError::VectorStore {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, path, "Weaviate response received");
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RagchatError::vector_store(format!(
            "Weaviate returned {status}: {body}"
        )))
    }
}

/// Extracts hit texts in server order.
///
/// A response without the class array, or with unparseable hits, yields no
/// chunks. GraphQL-level errors are returned to the caller.
fn hits_from_response(
    response: GraphQlResponse,
    class_name: &str,
) -> Result<Vec<String>, RagchatError> {
    if !response.errors.is_empty() {
        let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(RagchatError::vector_store(format!(
            "GraphQL errors: {}",
            messages.join("; ")
        )));
    }

    let Some(raw_hits) = response
        .data
        .and_then(|d| d.get)
        .and_then(|mut get| get.remove(class_name))
        .flatten()
    else {
        warn!(class = class_name, "malformed Weaviate response, no hits array");
        return Ok(Vec::new());
    };

    let mut texts = Vec::with_capacity(raw_hits.len());
    for raw in raw_hits {
        match serde_json::from_value::<Hit>(raw) {
            Ok(hit) => {
                debug!(
                    certainty = hit.additional.and_then(|a| a.certainty),
                    "retrieved chunk"
                );
                texts.push(hit.text);
            }
            Err(e) => {
                warn!(error = %e, "malformed Weaviate hit, discarding results");
                return Ok(Vec::new());
            }
        }
    }
    Ok(texts)
}

fn check_vector(vector: &[f32]) -> Result<(), RagchatError> {
    if vector.is_empty() {
        return Err(RagchatError::vector_store("empty query vector"));
    }
    if vector.iter().any(|v| !v.is_finite()) {
        return Err(RagchatError::vector_store("query vector has non-finite components"));
    }
    Ok(())
}

#[async_trait]
impl PluginAdapter for WeaviateStore {
    fn name(&self) -> &str {
        "weaviate"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VectorStore
    }

    async fn health_check(&self) -> Result<HealthStatus, RagchatError> {
        let url = format!("{}/v1/.well-known/ready", self.endpoint);
        Ok(match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => HealthStatus::Healthy,
            Ok(resp) => HealthStatus::Unhealthy(format!("ready probe returned {}", resp.status())),
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), RagchatError> {
        debug!("Weaviate store shutting down");
        Ok(())
    }
}

#[async_trait]
impl VectorStoreAdapter for WeaviateStore {
    async fn query(
        &self,
        vector: &Embedding,
        top_k: usize,
        class_name: &str,
    ) -> Result<Vec<String>, RagchatError> {
        match self.try_query(vector, top_k, class_name).await {
            Ok(hits) => Ok(hits),
            Err(e) => {
                warn!(error = %e, class = class_name, "Weaviate query failed, using no context");
                Ok(Vec::new())
            }
        }
    }

    async fn upsert(&self, chunk: DocumentChunk, class_name: &str) -> Result<String, RagchatError> {
        check_vector(&chunk.vector)?;
        let id = uuid::Uuid::new_v4().to_string();
        let body = CreateObject {
            class: class_name,
            id: id.clone(),
            properties: ObjectProperties { text: &chunk.text },
            vector: &chunk.vector,
        };
        self.send_json("/v1/objects", &body).await?;
        Ok(id)
    }
}
