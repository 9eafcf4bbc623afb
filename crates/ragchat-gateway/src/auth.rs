// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session middleware for the gateway.
//!
//! Protected routes expect `Authorization: Bearer <token>` where the token
//! was issued by `/api/login`. When login is not required every request
//! passes and no [`SessionUser`] is attached.

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::handlers::ErrorResponse;
use crate::server::AppState;

/// Email of the authenticated caller, inserted into request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser(pub String);

/// Extracts the token from an `Authorization: Bearer` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Rejects requests without a live session when login is required.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if !state.settings.require_login {
        return next.run(request).await;
    }

    let email = bearer_token(request.headers())
        .and_then(|token| state.credentials.sessions().validate(token));

    match email {
        Some(email) => {
            request.extensions_mut().insert(SessionUser(email));
            next.run(request).await
        }
        None => {
            tracing::debug!(path = %request.uri().path(), "rejected request without valid session");
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "login required".to_string(),
                }),
            )
                .into_response()
        }
    }
}
