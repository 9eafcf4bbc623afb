// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval-augmented prompt assembly.
//!
//! For each turn the assembler:
//! - fetches the nearest knowledge-base chunks for the latest user message
//! - extracts memory facts from the history and keeps the relevant ones
//! - renders the fixed-layout augmented prompt in place of that message
//!
//! Retrieval and scoring failures degrade the prompt; they never fail the
//! turn.

pub mod assembler;
pub mod chunking;
pub mod prompt;
pub mod retriever;

pub use assembler::{AssembledPrompt, ContextAssembler};
pub use chunking::chunk_text;
pub use retriever::{ContextRetriever, DEFAULT_TOP_K};
