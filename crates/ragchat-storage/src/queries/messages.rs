// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat log operations.

use std::str::FromStr;

use ragchat_core::RagchatError;
use ragchat_core::types::{Role, StoredMessage, now_timestamp};
use rusqlite::params;

use crate::database::Database;

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredMessage> {
    let role: String = row.get(1)?;
    let role = Role::from_str(&role).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(StoredMessage {
        id: row.get(0)?,
        role,
        content: row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// Append a message and return the stored row.
pub async fn insert_message(
    db: &Database,
    role: Role,
    content: &str,
) -> Result<StoredMessage, RagchatError> {
    let message = StoredMessage {
        id: uuid::Uuid::new_v4().to_string(),
        role,
        content: content.to_string(),
        created_at: now_timestamp(),
    };
    let row = message.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, role, content, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![row.id, row.role.to_string(), row.content, row.created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    Ok(message)
}

/// The most recent `limit` messages, oldest first.
pub async fn recent_messages(db: &Database, limit: usize) -> Result<Vec<StoredMessage>, RagchatError> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let mut messages = db
        .connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, role, content, created_at FROM messages
                 ORDER BY seq DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], row_to_message)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    messages.reverse();
    Ok(messages)
}

/// Messages whose content contains `query`, case-insensitively for ASCII,
/// newest first.
pub async fn search_messages(
    db: &Database,
    query: &str,
    limit: usize,
) -> Result<Vec<StoredMessage>, RagchatError> {
    let pattern = format!("%{}%", escape_like(query.trim()));
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, role, content, created_at FROM messages
                 WHERE content LIKE ?1 ESCAPE '\\'
                 ORDER BY seq DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![pattern, limit], row_to_message)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
