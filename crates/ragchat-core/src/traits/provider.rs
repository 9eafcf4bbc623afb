// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for language model integrations.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::RagchatError;
use crate::traits::adapter::PluginAdapter;
use crate::types::ProviderRequest;

/// A lazy, single-pass sequence of text fragments from a model.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, RagchatError>> + Send>>;

/// Adapter for language model providers that stream their output.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends the conversation and returns the model's output as a stream of
    /// text fragments in arrival order.
    async fn stream(&self, request: ProviderRequest) -> Result<FragmentStream, RagchatError>;
}
