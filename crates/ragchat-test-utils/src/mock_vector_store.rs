// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock vector store holding chunks in memory.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use ragchat_core::RagchatError;
use ragchat_core::traits::adapter::PluginAdapter;
use ragchat_core::traits::vector_store::VectorStoreAdapter;
use ragchat_core::types::{AdapterType, DocumentChunk, Embedding, HealthStatus};

/// A recorded `query` call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub vector: Embedding,
    pub top_k: usize,
    pub class_name: String,
}

/// A vector store that answers every query with the first `top_k` stored
/// chunks, ignoring the vector.
#[derive(Clone)]
pub struct MockVectorStore {
    chunks: Arc<Mutex<Vec<String>>>,
    queries: Arc<Mutex<Vec<RecordedQuery>>>,
    upserts: Arc<Mutex<Vec<(DocumentChunk, String)>>>,
    failing: bool,
}

impl MockVectorStore {
    pub fn new() -> Self {
        Self {
            chunks: Arc::new(Mutex::new(Vec::new())),
            queries: Arc::new(Mutex::new(Vec::new())),
            upserts: Arc::new(Mutex::new(Vec::new())),
            failing: false,
        }
    }

    /// Pre-load chunks returned by `query`.
    pub fn with_chunks(chunks: &[&str]) -> Self {
        Self {
            chunks: Arc::new(Mutex::new(chunks.iter().map(|c| c.to_string()).collect())),
            ..Self::new()
        }
    }

    /// A store whose every call returns an error.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    pub async fn queries(&self) -> Vec<RecordedQuery> {
        self.queries.lock().await.clone()
    }

    pub async fn upserts(&self) -> Vec<(DocumentChunk, String)> {
        self.upserts.lock().await.clone()
    }
}

impl Default for MockVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockVectorStore {
    fn name(&self) -> &str {
        "mock-vector-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VectorStore
    }

    async fn health_check(&self) -> Result<HealthStatus, RagchatError> {
        if self.failing {
            Ok(HealthStatus::Unhealthy("mock store is failing".into()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }

    async fn shutdown(&self) -> Result<(), RagchatError> {
        Ok(())
    }
}

#[async_trait]
impl VectorStoreAdapter for MockVectorStore {
    async fn query(
        &self,
        vector: &Embedding,
        top_k: usize,
        class_name: &str,
    ) -> Result<Vec<String>, RagchatError> {
        self.queries.lock().await.push(RecordedQuery {
            vector: vector.clone(),
            top_k,
            class_name: class_name.to_string(),
        });
        if self.failing {
            return Err(RagchatError::vector_store("mock vector store failure"));
        }
        Ok(self.chunks.lock().await.iter().take(top_k).cloned().collect())
    }

    async fn upsert(&self, chunk: DocumentChunk, class_name: &str) -> Result<String, RagchatError> {
        if self.failing {
            return Err(RagchatError::vector_store("mock vector store failure"));
        }
        self.chunks.lock().await.push(chunk.text.clone());
        self.upserts
            .lock()
            .await
            .push((chunk, class_name.to_string()));
        Ok(uuid::Uuid::new_v4().to_string())
    }
}
