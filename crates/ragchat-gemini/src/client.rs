// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini REST API.
//!
//! Provides [`GeminiClient`] which handles authentication, the
//! `embedContent` and `streamGenerateContent` endpoints, and transient error
//! retry when opening a stream.

use std::pin::Pin;
use std::time::Duration;

use futures::Stream;
use ragchat_core::RagchatError;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::{debug, warn};

use crate::sse;
use crate::types::{
    ApiErrorResponse, Content, EmbedContentRequest, EmbedContentResponse, GenerateContentRequest,
};

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Builds the error variant for one endpoint family.
type ErrorCtor = fn(String, Option<BoxedSource>) -> RagchatError;

fn provider_error(message: String, source: Option<BoxedSource>) -> RagchatError {
    RagchatError::Provider { message, source }
}

fn embedding_error(message: String, source: Option<BoxedSource>) -> RagchatError {
    RagchatError::Embedding { message, source }
}

/// HTTP client for Gemini API communication.
///
/// Opening a stream is retried once after one second on 429, 500, 503 and
/// 529. Embedding calls are single attempts.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    stream_retries: u32,
}

impl GeminiClient {
    /// Creates a client authenticating with `api_key` against `base_url`
    /// (which includes the version segment, e.g. `.../v1beta`).
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, RagchatError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key).map_err(|e| {
                RagchatError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| RagchatError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            stream_retries: 1,
        })
    }

    /// Embeds `text` with `model` (bare name, e.g. `embedding-001`).
    pub async fn embed_content(&self, model: &str, text: &str) -> Result<Vec<f32>, RagchatError> {
        let url = format!("{}/models/{model}:embedContent", self.base_url);
        let body = EmbedContentRequest {
            model: format!("models/{model}"),
            content: Content::text(None, text),
        };

        let response = self.post(&url, &body, embedding_error, 0).await?;
        let parsed: EmbedContentResponse = response.json().await.map_err(|e| {
            RagchatError::Embedding {
                message: format!("failed to parse embedding response: {e}"),
                source: Some(Box::new(e)),
            }
        })?;

        if parsed.embedding.values.is_empty() {
            return Err(RagchatError::embedding("embedding response had no values"));
        }
        Ok(parsed.embedding.values)
    }

    /// Opens a streamed generation and returns its text fragments.
    pub async fn stream_generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<String, RagchatError>> + Send>>, RagchatError>
    {
        let url = format!("{}/models/{model}:streamGenerateContent?alt=sse", self.base_url);
        let response = self
            .post(&url, request, provider_error, self.stream_retries)
            .await?;
        Ok(sse::parse_sse_stream(response))
    }

    /// Lists models. Used as a lightweight reachability probe.
    pub async fn list_models(&self) -> Result<(), RagchatError> {
        let url = format!("{}/models?pageSize=1", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| provider_error(format!("HTTP request failed: {e}"), Some(Box::new(e))))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(RagchatError::provider(format!(
                "API returned {}",
                response.status()
            )))
        }
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        make_err: ErrorCtor,
        retries: u32,
    ) -> Result<reqwest::Response, RagchatError> {
        let mut last_error = None;

        for attempt in 0..=retries {
            if attempt > 0 {
                warn!(attempt, "retrying Gemini request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(url)
                .json(body)
                .send()
                .await
                .map_err(|e| make_err(format!("HTTP request failed: {e}"), Some(Box::new(e))))?;

            let status = response.status();
            debug!(status = %status, attempt, "Gemini response received");

            if status.is_success() {
                return Ok(response);
            }

            let body = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < retries {
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(make_err(format!("API returned {status}: {body}"), None));
                continue;
            }

            let error_msg = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "Gemini API error ({}): {}",
                    api_err.error.status, api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(make_err(error_msg, None));
        }

        Err(last_error
            .unwrap_or_else(|| make_err("request failed after retries".into(), None)))
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503 | 529)
}
