// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedding adapter backed by a lookup table.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use ragchat_core::RagchatError;
use ragchat_core::traits::adapter::PluginAdapter;
use ragchat_core::traits::embedding::EmbeddingAdapter;
use ragchat_core::types::{AdapterType, Embedding, HealthStatus};

/// An embedding adapter that returns pre-registered vectors.
///
/// Texts without a registered vector get the default vector (`[1.0, 0.0]`
/// unless overridden). Every call is recorded, in completion order.
#[derive(Clone)]
pub struct MockEmbedder {
    vectors: HashMap<String, Embedding>,
    default_vector: Embedding,
    failing: HashSet<String>,
    fail_all: bool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self {
            vectors: HashMap::new(),
            default_vector: vec![1.0, 0.0],
            failing: HashSet::new(),
            fail_all: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register the vector returned for `text`.
    pub fn with_vector(mut self, text: &str, vector: Embedding) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    /// Vector returned for texts with no registered vector.
    pub fn with_default(mut self, vector: Embedding) -> Self {
        self.default_vector = vector;
        self
    }

    /// Make embedding `text` fail.
    pub fn failing_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    /// Make every call fail.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::new()
        }
    }

    /// Texts embedded so far.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
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
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, RagchatError> {
        self.calls.lock().await.push(text.to_string());
        if self.fail_all || self.failing.contains(text) {
            return Err(RagchatError::embedding(format!("mock failure embedding `{text}`")));
        }
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.default_vector.clone()))
    }
}
