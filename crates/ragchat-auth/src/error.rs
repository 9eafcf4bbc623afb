// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication error type.

use ragchat_core::RagchatError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("email already registered")]
    EmailTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Hashing, salt generation or a corrupt stored hash.
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Storage(#[from] RagchatError),
}

impl From<AuthError> for RagchatError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Storage(inner) => inner,
            AuthError::MissingField(_) => RagchatError::InvalidInput(e.to_string()),
            other => RagchatError::Auth(other.to_string()),
        }
    }
}
