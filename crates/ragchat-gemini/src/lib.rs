// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gemini adapters for ragchat.
//!
//! [`GeminiProvider`] implements [`ProviderAdapter`] over
//! `streamGenerateContent`, and [`GeminiEmbedder`] implements
//! [`EmbeddingAdapter`] over `embedContent`. Both share a [`GeminiClient`].

pub mod client;
pub mod sse;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use ragchat_config::model::GeminiConfig;
use ragchat_core::error::RagchatError;
use ragchat_core::traits::{EmbeddingAdapter, FragmentStream, PluginAdapter, ProviderAdapter};
use ragchat_core::types::{AdapterType, Embedding, HealthStatus, Message, ProviderRequest, Role};
use tracing::{debug, info};

pub use crate::client::GeminiClient;
use crate::types::{Content, GenerateContentRequest};

/// Builds the shared client from config.
///
/// The API key is resolved by the config loader (file, `RAGCHAT_GEMINI_API_KEY`
/// or `GOOGLE_GENERATIVE_AI_API_KEY`); a missing key is reported here.
pub fn client_from_config(config: &GeminiConfig) -> Result<GeminiClient, RagchatError> {
    let api_key = resolve_api_key(&config.api_key)?;
    GeminiClient::new(
        &api_key,
        &config.base_url,
        Duration::from_secs(config.timeout_secs),
    )
}

fn resolve_api_key(config_key: &Option<String>) -> Result<String, RagchatError> {
    match config_key {
        Some(key) if !key.trim().is_empty() => Ok(key.clone()),
        _ => Err(RagchatError::Config(
            "Gemini API key not found. Set gemini.api_key in config or GOOGLE_GENERATIVE_AI_API_KEY environment variable.".into(),
        )),
    }
}

/// Streams chat answers from a Gemini model.
pub struct GeminiProvider {
    client: GeminiClient,
    default_model: String,
}

impl GeminiProvider {
    pub fn new(config: &GeminiConfig) -> Result<Self, RagchatError> {
        let client = client_from_config(config)?;
        info!(model = config.chat_model, "Gemini provider initialized");
        Ok(Self::with_client(client, config.chat_model.clone()))
    }

    pub fn with_client(client: GeminiClient, default_model: String) -> Self {
        Self {
            client,
            default_model,
        }
    }

    fn to_generate_request(request: &ProviderRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: request.messages.iter().map(to_content).collect(),
        }
    }
}

/// Gemini names the assistant role `model`.
fn to_content(message: &Message) -> Content {
    let role = match message.role {
        Role::User => "user",
        Role::Assistant => "model",
    };
    Content::text(Some(role), message.content.clone())
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, RagchatError> {
        Ok(match self.client.list_models().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Degraded(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), RagchatError> {
        debug!("Gemini provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for GeminiProvider {
    async fn stream(&self, request: ProviderRequest) -> Result<FragmentStream, RagchatError> {
        let model = if request.model.is_empty() {
            self.default_model.as_str()
        } else {
            request.model.as_str()
        };
        let api_request = Self::to_generate_request(&request);
        let fragments = self.client.stream_generate_content(model, &api_request).await?;

        Ok(Box::pin(fragments.filter(|item| {
            let keep = !matches!(item, Ok(text) if text.is_empty());
            async move { keep }
        })))
    }
}

/// Embeds text with a Gemini embedding model.
pub struct GeminiEmbedder {
    client: GeminiClient,
    model: String,
}

impl GeminiEmbedder {
    pub fn new(config: &GeminiConfig) -> Result<Self, RagchatError> {
        let client = client_from_config(config)?;
        info!(model = config.embedding_model, "Gemini embedder initialized");
        Ok(Self::with_client(client, config.embedding_model.clone()))
    }

    pub fn with_client(client: GeminiClient, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl PluginAdapter for GeminiEmbedder {
    fn name(&self) -> &str {
        "gemini-embedding"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, RagchatError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RagchatError> {
        debug!("Gemini embedder shutting down");
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, RagchatError> {
        self.client.embed_content(&self.model, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> GeminiConfig {
        GeminiConfig {
            api_key: Some("test-key".into()),
            base_url: base_url.into(),
            ..GeminiConfig::default()
        }
    }

    #[test]
    fn missing_api_key_is_config_error() {
        let cfg = GeminiConfig::default();
        assert!(matches!(
            GeminiProvider::new(&cfg),
            Err(RagchatError::Config(_))
        ));
        let blank = GeminiConfig {
            api_key: Some("  ".into()),
            ..GeminiConfig::default()
        };
        assert!(GeminiEmbedder::new(&blank).is_err());
    }

    #[test]
    fn roles_map_to_gemini_names() {
        let request = ProviderRequest {
            model: "gemini-1.5-flash".into(),
            messages: vec![Message::user("hi"), Message::assistant("hello"), Message::user("q")],
        };
        let api = GeminiProvider::to_generate_request(&request);
        let roles: Vec<_> = api.contents.iter().map(|c| c.role.clone().unwrap()).collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
        assert_eq!(api.contents[2].joined_text(), "q");
    }

    #[test]
    fn plugin_adapter_metadata() {
        let provider = GeminiProvider::new(&config("http://localhost")).unwrap();
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.version(), semver::Version::new(0, 1, 0));
        assert_eq!(provider.adapter_type(), AdapterType::Provider);

        let embedder = GeminiEmbedder::new(&config("http://localhost")).unwrap();
        assert_eq!(embedder.adapter_type(), AdapterType::Embedding);
    }

    #[tokio::test]
    async fn provider_streams_non_empty_fragments() {
        let server = MockServer::start().await;
        let sse = ["Hel", "", "lo"]
            .iter()
            .map(|t| {
                format!(
                    "data: {}\n\n",
                    serde_json::json!({"candidates": [{"content": {"role": "model", "parts": [{"text": t}]}}]})
                )
            })
            .collect::<String>();
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:streamGenerateContent"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "prompt"}]}]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse),
            )
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(&config(&server.uri())).unwrap();
        let stream = provider
            .stream(ProviderRequest {
                model: String::new(),
                messages: vec![Message::user("prompt")],
            })
            .await
            .unwrap();
        let fragments: Vec<String> = stream.map(|r| r.unwrap()).collect().await;
        assert_eq!(fragments, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn embedder_returns_values() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/embedding-001:embedContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"embedding": {"values": [0.5, 0.25]}}),
            ))
            .mount(&server)
            .await;

        let embedder = GeminiEmbedder::new(&config(&server.uri())).unwrap();
        assert_eq!(embedder.embed("text").await.unwrap(), vec![0.5, 0.25]);
    }

    #[tokio::test]
    async fn health_check_degrades_when_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(&config(&server.uri())).unwrap();
        assert!(matches!(
            provider.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
    }
}
