// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds every long-lived component once from configuration.
//!
//! Handles are created here and passed down explicitly; nothing is cached
//! at module level.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ragchat_auth::{CredentialService, SessionRegistry};
use ragchat_config::RagchatConfig;
use ragchat_context::{ContextAssembler, ContextRetriever};
use ragchat_core::RagchatError;
use ragchat_core::traits::{EmbeddingAdapter, ProviderAdapter, StorageAdapter, VectorStoreAdapter};
use ragchat_gateway::{AppState, GatewaySettings, HealthState};
use ragchat_gemini::{GeminiEmbedder, GeminiProvider};
use ragchat_memory::{FactScorer, PatternFactExtractor};
use ragchat_pipeline::{ChatPipeline, Outbox};
use ragchat_storage::SqliteStorage;
use ragchat_weaviate::WeaviateStore;
use tracing::info;

/// Renders the Prometheus exposition text.
pub type MetricsRender = Arc<dyn Fn() -> String + Send + Sync>;

/// The embedding and vector-store pair used by retrieval and ingestion.
#[derive(Clone)]
pub struct KnowledgeBase {
    pub embedder: Arc<dyn EmbeddingAdapter>,
    pub vector_store: Arc<dyn VectorStoreAdapter>,
}

impl KnowledgeBase {
    pub fn from_config(config: &RagchatConfig) -> Result<Self, RagchatError> {
        Ok(Self {
            embedder: Arc::new(GeminiEmbedder::new(&config.gemini)?),
            vector_store: Arc::new(WeaviateStore::new(&config.weaviate)?),
        })
    }
}

/// A fully wired service.
pub struct App {
    pub state: AppState,
    pub storage: Arc<dyn StorageAdapter>,
    /// Owned so shutdown can drain it.
    pub outbox: Outbox,
}

/// Assembler and pipeline over the given adapters, without an outbox.
pub fn build_pipeline(
    config: &RagchatConfig,
    kb: &KnowledgeBase,
    provider: Arc<dyn ProviderAdapter>,
) -> ChatPipeline {
    let retriever = ContextRetriever::new(
        kb.embedder.clone(),
        kb.vector_store.clone(),
        config.retrieval.top_k,
        config.weaviate.class_name.clone(),
    );
    let assembler = ContextAssembler::new(
        retriever,
        Arc::new(PatternFactExtractor::new()),
        FactScorer::new(kb.embedder.clone(), config.retrieval.similarity_threshold),
    );
    ChatPipeline::new(Arc::new(assembler), provider, config.gemini.chat_model.clone())
}

/// Opens storage, connects the hosted adapters and starts the outbox.
pub async fn build_app(
    config: &RagchatConfig,
    prometheus_render: Option<MetricsRender>,
) -> Result<App, RagchatError> {
    let kb = KnowledgeBase::from_config(config)?;
    let provider: Arc<dyn ProviderAdapter> = Arc::new(GeminiProvider::new(&config.gemini)?);

    let sqlite = SqliteStorage::new(config.storage.clone());
    sqlite.initialize().await?;
    let storage: Arc<dyn StorageAdapter> = Arc::new(sqlite);

    let outbox = Outbox::spawn(storage.clone(), config.outbox.capacity);
    let pipeline = build_pipeline(config, &kb, provider.clone()).with_outbox(outbox.handle());

    let sessions = Arc::new(SessionRegistry::new(Duration::from_secs(
        config.auth.session_ttl_secs,
    )));
    let credentials = Arc::new(CredentialService::new(storage.clone(), sessions));

    let state = AppState {
        pipeline,
        provider,
        embedder: kb.embedder,
        vector_store: kb.vector_store,
        storage: storage.clone(),
        credentials,
        settings: GatewaySettings {
            class_name: config.weaviate.class_name.clone(),
            chunk_size: config.retrieval.chunk_size,
            chunk_overlap: config.retrieval.chunk_overlap,
            require_login: config.auth.require_login,
        },
        health: HealthState {
            start_time: Instant::now(),
            prometheus_render,
        },
    };

    info!(
        model = %config.gemini.chat_model,
        class = %config.weaviate.class_name,
        require_login = config.auth.require_login,
        "application wired"
    );
    Ok(App {
        state,
        storage,
        outbox,
    })
}
