// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Network-backed adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod embedding;
pub mod extractor;
pub mod provider;
pub mod storage;
pub mod vector_store;

pub use adapter::PluginAdapter;
pub use embedding::EmbeddingAdapter;
pub use extractor::FactExtractor;
pub use provider::{FragmentStream, ProviderAdapter};
pub use storage::StorageAdapter;
pub use vector_store::VectorStoreAdapter;
