// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Accounts and login sessions for ragchat.
//!
//! Passwords are stored as Argon2id PHC hashes; sessions are random bearer
//! tokens held in memory with a fixed time-to-live.

pub mod error;
pub mod password;
pub mod service;
pub mod session;

pub use error::AuthError;
pub use password::{hash_password, verify_password};
pub use service::CredentialService;
pub use session::SessionRegistry;
