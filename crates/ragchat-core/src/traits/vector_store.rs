// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector store adapter trait for nearest-neighbor retrieval.

use async_trait::async_trait;

use crate::error::RagchatError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{DocumentChunk, Embedding};

/// Adapter for a managed vector-search database.
#[async_trait]
pub trait VectorStoreAdapter: PluginAdapter {
    /// Returns the text of up to `top_k` stored chunks of `class_name`
    /// nearest to `vector`, closest first.
    ///
    /// Fails closed: an unreachable store, an error status or a response of
    /// unexpected shape is logged and yields an empty list. `Err` is kept
    /// for adapters that cannot query at all.
    async fn query(
        &self,
        vector: &Embedding,
        top_k: usize,
        class_name: &str,
    ) -> Result<Vec<String>, RagchatError>;

    /// Stores a chunk with its vector under `class_name` and returns the
    /// generated object id.
    async fn upsert(&self, chunk: DocumentChunk, class_name: &str) -> Result<String, RagchatError>;
}
