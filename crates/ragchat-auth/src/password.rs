// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id password hashing.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so
//! the parameters travel with each hash and can be raised without
//! invalidating existing accounts.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use ring::rand::{SecureRandom, SystemRandom};
use secrecy::{ExposeSecret, SecretString};

use crate::error::AuthError;

/// Hash `password` with the default Argon2id parameters (m=19456, t=2, p=1).
pub fn hash_password(password: &SecretString) -> Result<String, AuthError> {
    hash_password_with(password, Params::default())
}

/// Hash `password` with explicit Argon2id parameters.
pub fn hash_password_with(password: &SecretString, params: Params) -> Result<String, AuthError> {
    let salt = SaltString::encode_b64(&generate_salt()?)
        .map_err(|e| AuthError::Hash(format!("invalid salt: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    argon2
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Check `password` against a stored PHC hash.
///
/// A mismatch is `Ok(false)`; a malformed hash is an error.
pub fn verify_password(password: &SecretString, phc: &str) -> Result<bool, AuthError> {
    let parsed =
        PasswordHash::new(phc).map_err(|e| AuthError::Hash(format!("stored hash unreadable: {e}")))?;
    match Argon2::default().verify_password(password.expose_secret().as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Hash(e.to_string())),
    }
}

/// Generate a random 16-byte salt.
fn generate_salt() -> Result<[u8; 16], AuthError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; 16];
    rng.fill(&mut salt)
        .map_err(|_| AuthError::Hash("failed to generate random salt".to_string()))?;
    Ok(salt)
}
