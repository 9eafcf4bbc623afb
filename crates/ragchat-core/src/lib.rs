// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the ragchat service.
//!
//! This crate provides the trait definitions, error type, and common types
//! shared by every other crate in the workspace. External collaborators
//! (embedding provider, vector store, language model, document store) are
//! reached only through the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

pub use error::RagchatError;
pub use types::{
    AdapterType, DocumentChunk, Embedding, HealthStatus, Message, ProviderRequest,
    Role, ScoredFact, StoredMessage, UserRecord,
};

pub use traits::{
    EmbeddingAdapter, FactExtractor, FragmentStream, PluginAdapter, ProviderAdapter,
    StorageAdapter, VectorStoreAdapter,
};
