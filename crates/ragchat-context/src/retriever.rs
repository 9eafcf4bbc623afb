// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge-base retrieval for a single question.

use std::sync::Arc;

use ragchat_core::error::RagchatError;
use ragchat_core::traits::{EmbeddingAdapter, VectorStoreAdapter};
use tracing::{debug, warn};

/// Default number of chunks fetched per question.
pub const DEFAULT_TOP_K: usize = 3;

/// Embeds a question and fetches its nearest knowledge-base chunks.
pub struct ContextRetriever {
    embedder: Arc<dyn EmbeddingAdapter>,
    store: Arc<dyn VectorStoreAdapter>,
    top_k: usize,
    class_name: String,
}

impl ContextRetriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingAdapter>,
        store: Arc<dyn VectorStoreAdapter>,
        top_k: usize,
        class_name: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            store,
            top_k,
            class_name: class_name.into(),
        }
    }

    /// Fetches up to `top_k` chunks, propagating embedding errors.
    ///
    /// A failing vector store yields no chunks.
    pub async fn try_retrieve(&self, question: &str) -> Result<Vec<String>, RagchatError> {
        let vector = self.embedder.embed(question).await?;
        let chunks = match self.store.query(&vector, self.top_k, &self.class_name).await {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(error = %e, class = %self.class_name, "vector store query failed");
                ragchat_prometheus::record_retrieval_failure();
                Vec::new()
            }
        };
        debug!(count = chunks.len(), class = %self.class_name, "retrieved context chunks");
        Ok(chunks)
    }

    /// Fetches up to `top_k` chunks. Any failure is logged and yields an
    /// empty list so the turn continues without knowledge-base context.
    pub async fn retrieve(&self, question: &str) -> Vec<String> {
        match self.try_retrieve(question).await {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(error = %e, "context retrieval failed, answering without knowledge base");
                ragchat_prometheus::record_retrieval_failure();
                Vec::new()
            }
        }
    }
}
