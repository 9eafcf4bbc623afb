// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for ragchat.
//!
//! Provides mock adapters for fast, deterministic, CI-runnable tests
//! without the hosted embedding, vector search or model services.
//!
//! # Components
//!
//! - [`MockEmbedder`] - Fixed text-to-vector table with injectable failures
//! - [`MockVectorStore`] - In-memory chunk list with an error mode
//! - [`MockProvider`] - Scripted fragment streams with request capture
//! - [`MockStorage`] - In-memory chat log and accounts with a failure switch

pub mod mock_embedder;
pub mod mock_provider;
pub mod mock_storage;
pub mod mock_vector_store;

pub use mock_embedder::MockEmbedder;
pub use mock_provider::{MockProvider, StreamScript};
pub use mock_storage::MockStorage;
pub use mock_vector_store::MockVectorStore;
