// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory storage adapter.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use ragchat_core::RagchatError;
use ragchat_core::traits::adapter::PluginAdapter;
use ragchat_core::traits::storage::StorageAdapter;
use ragchat_core::types::{AdapterType, HealthStatus, Role, StoredMessage, UserRecord};

/// Keeps messages and users in vectors. Writes can be made to fail at
/// runtime with [`MockStorage::set_failing`].
#[derive(Clone, Default)]
pub struct MockStorage {
    messages: Arc<Mutex<Vec<StoredMessage>>>,
    users: Arc<Mutex<Vec<UserRecord>>>,
    failing: Arc<AtomicBool>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every stored message, oldest first.
    pub async fn messages(&self) -> Vec<StoredMessage> {
        self.messages.lock().await.clone()
    }

    fn check(&self) -> Result<(), RagchatError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(RagchatError::Storage {
                source: "mock storage failure".into(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PluginAdapter for MockStorage {
    fn name(&self) -> &str {
        "mock-storage"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, RagchatError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RagchatError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for MockStorage {
    async fn initialize(&self) -> Result<(), RagchatError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), RagchatError> {
        Ok(())
    }

    async fn insert_message(&self, role: Role, content: &str) -> Result<StoredMessage, RagchatError> {
        self.check()?;
        let message = StoredMessage {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.to_string(),
            created_at: ragchat_core::types::now_timestamp(),
        };
        self.messages.lock().await.push(message.clone());
        Ok(message)
    }

    async fn recent_messages(&self, limit: usize) -> Result<Vec<StoredMessage>, RagchatError> {
        self.check()?;
        let messages = self.messages.lock().await;
        let start = messages.len().saturating_sub(limit);
        Ok(messages[start..].to_vec())
    }

    async fn search_messages(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, RagchatError> {
        self.check()?;
        let needle = query.to_lowercase();
        Ok(self
            .messages
            .lock()
            .await
            .iter()
            .rev()
            .filter(|m| m.content.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRecord, RagchatError> {
        self.check()?;
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email == email) {
            return Err(RagchatError::InvalidInput(format!(
                "email already registered: {email}"
            )));
        }
        let user = UserRecord {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: ragchat_core::types::now_timestamp(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, email: &str) -> Result<Option<UserRecord>, RagchatError> {
        self.check()?;
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }
}
