// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account operations.

use ragchat_core::RagchatError;
use ragchat_core::types::{UserRecord, now_timestamp};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, is_unique_violation, map_tr_err};

/// Insert a new account.
///
/// A duplicate email yields [`RagchatError::InvalidInput`].
pub async fn create_user(
    db: &Database,
    email: &str,
    password_hash: &str,
) -> Result<UserRecord, RagchatError> {
    let user = UserRecord {
        id: uuid::Uuid::new_v4().to_string(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        created_at: now_timestamp(),
    };
    let row = user.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![row.id, row.email, row.password_hash, row.created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RagchatError::InvalidInput(format!("email already registered: {email}"))
            } else {
                map_tr_err(e)
            }
        })?;
    Ok(user)
}

/// Look up an account by exact email.
pub async fn find_user(db: &Database, email: &str) -> Result<Option<UserRecord>, RagchatError> {
    let email = email.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, email, password_hash, created_at FROM users WHERE email = ?1",
                params![email],
                |row| {
                    Ok(UserRecord {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        password_hash: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("users.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn create_then_find() {
        let (db, _dir) = setup_db().await;
        let created = create_user(&db, "a@example.com", "$argon2id$hash").await.unwrap();

        let found = find_user(&db, "a@example.com").await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(find_user(&db, "b@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_invalid_input() {
        let (db, _dir) = setup_db().await;
        create_user(&db, "dup@example.com", "h1").await.unwrap();

        let err = create_user(&db, "dup@example.com", "h2").await.unwrap_err();
        assert!(matches!(err, RagchatError::InvalidInput(_)), "got: {err}");
    }
}
