// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat turn pipeline for ragchat.
//!
//! The [`ChatPipeline`] runs one turn per request:
//! - assembles the augmented prompt (context retrieval and memory facts)
//! - streams the model's answer as monotonically growing content
//! - converts any model failure into a fixed fallback answer
//! - hands the question and answer to the persistence [`Outbox`]

pub mod outbox;
pub mod shutdown;
pub mod turn;

pub use outbox::{Outbox, OutboxHandle, OutboxStats, PendingMessage, Submitted};
pub use turn::{ChatPipeline, FALLBACK_MESSAGE, TurnEvent, TurnOutcome, TurnState, TurnStream};
