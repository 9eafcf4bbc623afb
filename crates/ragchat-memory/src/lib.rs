// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-turn conversation memory.
//!
//! Memory is never persisted: every turn re-extracts facts from the full
//! history and scores them against the current question.
//!
//! - **PatternFactExtractor**: lexical "my name is" / "i live in" facts
//! - **FactScorer**: concurrent embedding and threshold filtering
//! - **similarity**: cosine similarity with NaN-safe checked variant

pub mod extractor;
pub mod scoring;
pub mod similarity;

pub use extractor::PatternFactExtractor;
pub use scoring::{DEFAULT_SIMILARITY_THRESHOLD, FactScorer, retain_relevant};
pub use similarity::{checked_similarity, cosine_similarity};
