// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registration and login against the account store.

use std::sync::Arc;

use argon2::Params;
use ragchat_core::{RagchatError, StorageAdapter, UserRecord};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use crate::error::AuthError;
use crate::password::{hash_password_with, verify_password};
use crate::session::SessionRegistry;

/// Registers accounts and opens sessions.
///
/// Emails are trimmed and lowercased before storage and lookup. Hashing runs
/// on the blocking thread pool.
pub struct CredentialService {
    storage: Arc<dyn StorageAdapter>,
    sessions: Arc<SessionRegistry>,
    params: Params,
}

impl CredentialService {
    pub fn new(storage: Arc<dyn StorageAdapter>, sessions: Arc<SessionRegistry>) -> Self {
        Self {
            storage,
            sessions,
            params: Params::default(),
        }
    }

    /// Overrides the Argon2id cost for newly hashed passwords.
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    pub async fn register(
        &self,
        email: &str,
        password: SecretString,
    ) -> Result<UserRecord, AuthError> {
        let email = normalize_email(email)?;
        if password.expose_secret().is_empty() {
            return Err(AuthError::MissingField("password"));
        }
        if self.storage.find_user(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let params = self.params.clone();
        let hash = tokio::task::spawn_blocking(move || hash_password_with(&password, params))
            .await
            .map_err(|e| AuthError::Hash(format!("hashing task failed: {e}")))??;

        match self.storage.create_user(&email, &hash).await {
            Ok(user) => {
                info!(email = %user.email, "account registered");
                Ok(user)
            }
            // Lost a race with a concurrent registration.
            Err(RagchatError::InvalidInput(_)) => Err(AuthError::EmailTaken),
            Err(e) => Err(e.into()),
        }
    }

    /// Verifies credentials and returns a new session token.
    pub async fn login(&self, email: &str, password: SecretString) -> Result<String, AuthError> {
        let email = normalize_email(email)?;
        let Some(user) = self.storage.find_user(&email).await? else {
            warn!(email = %email, "login for unknown account");
            return Err(AuthError::UserNotFound);
        };

        let phc = user.password_hash;
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &phc))
            .await
            .map_err(|e| AuthError::Hash(format!("verification task failed: {e}")))??;
        if !matches {
            warn!(email = %email, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        self.sessions.issue(&email)
    }
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AuthError::MissingField("email"));
    }
    Ok(email)
}
