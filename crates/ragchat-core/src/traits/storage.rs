// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the document store (chat log and accounts).

use async_trait::async_trait;

use crate::error::RagchatError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Role, StoredMessage, UserRecord};

/// Adapter for the persistence backend.
///
/// Holds the chat log and user credentials. A single instance is opened at
/// startup and shared by every request.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection setup).
    async fn initialize(&self) -> Result<(), RagchatError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), RagchatError>;

    /// Appends a chat message to the log.
    async fn insert_message(&self, role: Role, content: &str) -> Result<StoredMessage, RagchatError>;

    /// Returns the most recent `limit` messages, oldest first.
    async fn recent_messages(&self, limit: usize) -> Result<Vec<StoredMessage>, RagchatError>;

    /// Returns up to `limit` messages containing `query` (case-insensitive),
    /// newest first.
    async fn search_messages(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, RagchatError>;

    /// Creates an account. Fails if the email is already registered.
    async fn create_user(&self, email: &str, password_hash: &str)
    -> Result<UserRecord, RagchatError>;

    /// Looks up an account by email.
    async fn find_user(&self, email: &str) -> Result<Option<UserRecord>, RagchatError>;
}
