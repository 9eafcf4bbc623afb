// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events streaming for POST /api/chat.
//!
//! Each turn event becomes one SSE event:
//! ```text
//! event: state
//! data: {"state":"model_streaming"}
//!
//! event: text_delta
//! data: {"text":"lo","content":"Hello"}
//!
//! event: message_stop
//! data: {"content":"Hello","state":"complete"}
//! ```
//! A failed turn still ends with `message_stop`, carrying the fallback text
//! and `"state":"failed"`.

use std::convert::Infallible;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use ragchat_core::types::Message;
use ragchat_pipeline::{TurnEvent, TurnState};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;

use crate::handlers::ErrorResponse;
use crate::server::AppState;

/// Turn events buffered between the turn task and the response body.
const EVENT_BUFFER: usize = 64;

/// Request body for POST /api/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Conversation so far, oldest first, ending with the new question.
    #[serde(default)]
    pub history: Vec<Message>,
}

/// POST /api/chat
///
/// Runs one turn and streams its events. The turn runs on its own task and
/// always finishes, so a client that disconnects mid-answer still gets both
/// messages persisted.
pub async fn post_chat(State(state): State<AppState>, Json(body): Json<ChatRequest>) -> Response {
    if body.history.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "history is empty".to_string(),
            }),
        )
            .into_response();
    }

    let (tx, rx) = mpsc::channel::<TurnEvent>(EVENT_BUFFER);
    let mut turn = state.pipeline.stream_turn(body.history);
    tokio::spawn(async move {
        let mut connected = true;
        while let Some(event) = turn.next().await {
            if connected && tx.send(event).await.is_err() {
                tracing::debug!("chat client disconnected, finishing turn in background");
                connected = false;
            }
        }
    });

    let events = futures::stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        Some((Ok::<_, Infallible>(to_sse_event(&event)), rx))
    });

    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}

fn to_sse_event(event: &TurnEvent) -> Event {
    let (name, payload) = event_payload(event);
    Event::default().event(name).data(payload.to_string())
}

/// SSE event name and JSON payload for a turn event.
pub fn event_payload(event: &TurnEvent) -> (&'static str, serde_json::Value) {
    match event {
        TurnEvent::State(state) => ("state", json!({ "state": state })),
        TurnEvent::Delta { fragment, content } => {
            ("text_delta", json!({ "text": fragment, "content": content }))
        }
        TurnEvent::Completed { content } => (
            "message_stop",
            json!({ "content": content, "state": TurnState::Complete }),
        ),
        TurnEvent::Failed { content, reason } => {
            tracing::warn!(reason = %reason, "chat turn failed, sending fallback answer");
            (
                "message_stop",
                json!({ "content": content, "state": TurnState::Failed }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_events_use_snake_case() {
        let (name, payload) = event_payload(&TurnEvent::State(TurnState::ModelStreaming));
        assert_eq!(name, "state");
        assert_eq!(payload, json!({ "state": "model_streaming" }));
    }

    #[test]
    fn deltas_carry_fragment_and_accumulated_content() {
        let (name, payload) = event_payload(&TurnEvent::Delta {
            fragment: "lo".to_string(),
            content: "Hello".to_string(),
        });
        assert_eq!(name, "text_delta");
        assert_eq!(payload["text"], "lo");
        assert_eq!(payload["content"], "Hello");
    }

    #[test]
    fn failure_ends_with_message_stop_and_hides_reason() {
        let (name, payload) = event_payload(&TurnEvent::Failed {
            content: ragchat_pipeline::FALLBACK_MESSAGE.to_string(),
            reason: "provider error: quota".to_string(),
        });
        assert_eq!(name, "message_stop");
        assert_eq!(payload["state"], "failed");
        assert_eq!(payload["content"], ragchat_pipeline::FALLBACK_MESSAGE);
        assert!(payload.get("reason").is_none());
    }

    #[test]
    fn chat_request_defaults_to_empty_history() {
        let req: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(req.history.is_empty());

        let req: ChatRequest =
            serde_json::from_str(r#"{"history":[{"role":"user","content":"hi"}]}"#).unwrap();
        assert_eq!(req.history, vec![Message::user("hi")]);
    }
}
