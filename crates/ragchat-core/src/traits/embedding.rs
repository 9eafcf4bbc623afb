// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter trait for vector embedding generation.

use async_trait::async_trait;

use crate::error::RagchatError;
use crate::traits::adapter::PluginAdapter;
use crate::types::Embedding;

/// Adapter mapping text to a fixed-length vector.
///
/// Used both for knowledge-base retrieval and for scoring memory facts
/// against the current question. Implementations do not retry.
#[async_trait]
pub trait EmbeddingAdapter: PluginAdapter {
    /// Generates the embedding for a single piece of text.
    async fn embed(&self, text: &str) -> Result<Embedding, RagchatError>;
}
