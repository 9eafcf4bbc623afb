// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ragchat ask` command: one turn from the terminal.

use std::io::Write;
use std::time::Duration;

use futures::StreamExt;
use ragchat_config::RagchatConfig;
use ragchat_core::RagchatError;
use ragchat_core::traits::StorageAdapter;
use ragchat_core::types::Message;
use ragchat_pipeline::shutdown::drain_outbox;
use ragchat_pipeline::{ChatPipeline, TurnEvent, TurnState};
use tracing::warn;

use crate::app::build_app;
use crate::serve::init_tracing;

/// Runs a single turn for `question`, printing the answer as it streams.
pub async fn run_ask(config: RagchatConfig, question: String) -> Result<(), RagchatError> {
    init_tracing(&config.server.log_level);

    let app = build_app(&config, None).await?;
    let mut stdout = std::io::stdout();
    let state = stream_answer(&app.state.pipeline, &question, &mut stdout).await?;

    if drain_outbox(app.outbox, Duration::from_secs(5)).await.is_none() {
        warn!("outbox did not drain, this turn may not be saved");
    }
    app.storage.close().await?;

    match state {
        TurnState::Failed => Err(RagchatError::provider("the model call failed")),
        _ => Ok(()),
    }
}

/// Streams one turn into `out` and returns the final state.
pub async fn stream_answer<W: Write>(
    pipeline: &ChatPipeline,
    question: &str,
    out: &mut W,
) -> Result<TurnState, RagchatError> {
    let io_err = |e: std::io::Error| RagchatError::Internal(format!("failed to write answer: {e}"));

    let mut events = pipeline.stream_turn(vec![Message::user(question)]);
    let mut state = TurnState::Idle;
    while let Some(event) = events.next().await {
        match event {
            TurnEvent::State(s) => state = s,
            TurnEvent::Delta { fragment, .. } => {
                out.write_all(fragment.as_bytes()).map_err(io_err)?;
                out.flush().map_err(io_err)?;
            }
            TurnEvent::Completed { .. } => writeln!(out).map_err(io_err)?,
            TurnEvent::Failed { content, .. } => writeln!(out, "{content}").map_err(io_err)?,
        }
    }
    Ok(state)
}
