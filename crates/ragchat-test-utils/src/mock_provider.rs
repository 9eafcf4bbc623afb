// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock language model provider for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with scripted fragment
//! streams, enabling fast tests of the streaming pipeline without calling
//! the hosted model.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, stream};
use tokio::sync::Mutex;

use ragchat_core::RagchatError;
use ragchat_core::traits::adapter::PluginAdapter;
use ragchat_core::traits::provider::{FragmentStream, ProviderAdapter};
use ragchat_core::types::{AdapterType, HealthStatus, ProviderRequest};

/// How one `stream` call behaves.
#[derive(Debug, Clone)]
pub enum StreamScript {
    /// Emit the fragments, then end.
    Fragments(Vec<String>),
    /// Refuse to open the stream.
    FailOnOpen(String),
    /// Emit the fragments, then yield an error.
    FailAfter(Vec<String>, String),
    /// Emit each fragment after waiting `Duration`, like a slow model.
    Paced(Vec<String>, Duration),
}

impl StreamScript {
    pub fn fragments(parts: &[&str]) -> Self {
        Self::Fragments(parts.iter().map(|p| p.to_string()).collect())
    }
}

/// A mock provider that pops scripts from a FIFO queue.
///
/// When the queue is empty, a single "mock response" fragment is streamed.
/// Every request is captured for later inspection. Clones share state.
#[derive(Clone)]
pub struct MockProvider {
    scripts: Arc<Mutex<VecDeque<StreamScript>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            scripts: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock provider pre-loaded with the given scripts.
    pub fn with_scripts(scripts: Vec<StreamScript>) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(VecDeque::from(scripts))),
            ..Self::new()
        }
    }

    /// Create a mock provider whose first stream yields `parts`.
    pub fn with_fragments(parts: &[&str]) -> Self {
        Self::with_scripts(vec![StreamScript::fragments(parts)])
    }

    pub async fn add_script(&self, script: StreamScript) {
        self.scripts.lock().await.push_back(script);
    }

    /// Requests received so far.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_script(&self) -> StreamScript {
        self.scripts
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| StreamScript::fragments(&["mock response"]))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, RagchatError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RagchatError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn stream(&self, request: ProviderRequest) -> Result<FragmentStream, RagchatError> {
        self.requests.lock().await.push(request);

        let items: Vec<Result<String, RagchatError>> = match self.next_script().await {
            StreamScript::Paced(parts, delay) => {
                let paced = stream::iter(parts).then(move |part| async move {
                    tokio::time::sleep(delay).await;
                    Ok::<_, RagchatError>(part)
                });
                return Ok(Box::pin(paced));
            }
            StreamScript::Fragments(parts) => parts.into_iter().map(Ok).collect(),
            StreamScript::FailOnOpen(reason) => return Err(RagchatError::provider(reason)),
            StreamScript::FailAfter(parts, reason) => parts
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(RagchatError::provider(reason))))
                .collect(),
        };

        Ok(Box::pin(stream::iter(items)))
    }
}
