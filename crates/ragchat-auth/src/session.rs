// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory login sessions keyed by opaque bearer tokens.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::AuthError;

struct SessionEntry {
    email: String,
    expires_at: Instant,
}

/// Maps 32-byte random tokens (hex encoded) to account emails.
///
/// Sessions do not survive a restart.
pub struct SessionRegistry {
    sessions: DashMap<String, SessionEntry>,
    ttl: Duration,
    rng: SystemRandom,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
            rng: SystemRandom::new(),
        }
    }

    /// Creates a session for `email` and returns its token.
    pub fn issue(&self, email: &str) -> Result<String, AuthError> {
        let mut bytes = Zeroizing::new([0u8; 32]);
        self.rng
            .fill(bytes.as_mut())
            .map_err(|_| AuthError::Hash("failed to generate session token".to_string()))?;
        let token = hex::encode(bytes.as_ref());
        self.sessions.insert(
            token.clone(),
            SessionEntry {
                email: email.to_string(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        debug!(email, "session issued");
        Ok(token)
    }

    /// The email owning `token`, if the session exists and has not expired.
    pub fn validate(&self, token: &str) -> Option<String> {
        let now = Instant::now();
        let expired = match self.sessions.get(token) {
            Some(entry) if entry.expires_at > now => return Some(entry.email.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.sessions.remove(token);
        }
        None
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Removes expired sessions and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.sessions.retain(|_, entry| {
            let keep = entry.expires_at > now;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_validates() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        let token = registry.issue("a@example.com").unwrap();

        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(registry.validate(&token).as_deref(), Some("a@example.com"));
        assert!(registry.validate("unknown").is_none());
    }

    #[test]
    fn expired_sessions_are_rejected_and_removed() {
        let registry = SessionRegistry::new(Duration::ZERO);
        let token = registry.issue("a@example.com").unwrap();

        assert!(registry.validate(&token).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn revoke_and_purge() {
        let registry = SessionRegistry::new(Duration::ZERO);
        let t1 = registry.issue("a@example.com").unwrap();
        registry.issue("b@example.com").unwrap();

        assert!(registry.revoke(&t1));
        assert!(!registry.revoke(&t1));
        assert_eq!(registry.purge_expired(), 1);
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn purge_counts_only_expired_while_logins_continue() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        std::thread::scope(|scope| {
            for worker in 0..4 {
                let registry = &registry;
                scope.spawn(move || {
                    for i in 0..250 {
                        registry.issue(&format!("u{worker}-{i}@example.com")).unwrap();
                    }
                });
            }
            let sweeper = scope.spawn(|| (0..200).map(|_| registry.purge_expired()).sum::<usize>());
            assert_eq!(sweeper.join().unwrap(), 0);
        });
        assert_eq!(registry.len(), 1000);
    }

    #[test]
    fn tokens_are_unique() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        let a = registry.issue("x@example.com").unwrap();
        let b = registry.issue("x@example.com").unwrap();
        assert_ne!(a, b);
    }
}
