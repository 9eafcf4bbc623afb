// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE parser for `streamGenerateContent?alt=sse` responses.
//!
//! Gemini sends unnamed events whose `data` is a complete
//! `GenerateContentResponse` JSON object. Each is mapped to the text of its
//! first candidate; chunks without text (finish markers, usage metadata) are
//! skipped.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures::stream::{Stream, StreamExt};
use ragchat_core::RagchatError;

use crate::types::GenerateContentChunk;

/// Parses a streaming response into a stream of text fragments.
pub fn parse_sse_stream(
    response: reqwest::Response,
) -> Pin<Box<dyn Stream<Item = Result<String, RagchatError>> + Send>> {
    let events = response.bytes_stream().eventsource();

    let fragments = events.filter_map(|result| async move {
        match result {
            Ok(event) => parse_event_data(&event.data).transpose(),
            Err(e) => Some(Err(RagchatError::provider(format!("SSE stream error: {e}")))),
        }
    });

    Box::pin(fragments)
}

/// Maps one SSE `data` payload to an optional fragment.
fn parse_event_data(data: &str) -> Result<Option<String>, RagchatError> {
    if data.trim().is_empty() {
        return Ok(None);
    }
    let chunk: GenerateContentChunk =
        serde_json::from_str(data).map_err(|e| RagchatError::Provider {
            message: format!("failed to parse stream chunk: {e}"),
            source: Some(Box::new(e)),
        })?;
    if let Some(err) = chunk.error {
        return Err(RagchatError::provider(format!(
            "Gemini API error ({} {}): {}",
            err.code, err.status, err.message
        )));
    }
    Ok(chunk.text())
}
