// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pluggable memory fact extraction.

use crate::types::Message;

/// Derives memory facts from a conversation history.
///
/// Extraction is recomputed from the full history each turn, so
/// implementations must be pure: the same history always yields the same
/// facts in the same order.
pub trait FactExtractor: Send + Sync {
    fn extract(&self, history: &[Message]) -> Vec<String>;
}
