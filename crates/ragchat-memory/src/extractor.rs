// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pattern-based memory extraction from conversation history.
//!
//! A lexical heuristic: phrasings outside the known patterns are missed and
//! negations such as "my name is not important" are captured verbatim.

use std::sync::LazyLock;

use ragchat_core::traits::FactExtractor;
use ragchat_core::types::{Message, Role};
use regex::Regex;
use tracing::debug;

/// A single "statement about the user" pattern.
struct FactPattern {
    regex: Regex,
    render: fn(&str) -> String,
}

static DEFAULT_PATTERNS: LazyLock<Vec<FactPattern>> = LazyLock::new(|| {
    vec![
        FactPattern {
            regex: Regex::new(r"(?i)my name is ([\w\s]+)").expect("static regex"),
            render: |name| format!("User's name is {name}."),
        },
        FactPattern {
            regex: Regex::new(r"(?i)i live in ([\w\s]+)").expect("static regex"),
            render: |place| format!("User lives in {place}."),
        },
    ]
});

/// Extracts facts the user states about themselves.
///
/// Scans user messages only, in history order. For each message every
/// pattern contributes at most its first match, name before location. No
/// deduplication is performed; a fact repeated across messages is emitted
/// once per message.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternFactExtractor;

impl PatternFactExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FactExtractor for PatternFactExtractor {
    fn extract(&self, history: &[Message]) -> Vec<String> {
        let facts: Vec<String> = history
            .iter()
            .filter(|msg| msg.role == Role::User)
            .flat_map(|msg| {
                DEFAULT_PATTERNS.iter().filter_map(|pattern| {
                    let capture = pattern.regex.captures(&msg.content)?.get(1)?;
                    let value = capture.as_str().trim();
                    (!value.is_empty()).then(|| (pattern.render)(value))
                })
            })
            .collect();

        debug!(count = facts.len(), "extracted memory facts from history");
        facts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_name_and_location_in_order() {
        let history = vec![Message::user("My name is Alice. I live in Boston.")];
        let facts = PatternFactExtractor.extract(&history);
        assert_eq!(facts, vec!["User's name is Alice.", "User lives in Boston."]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let history = vec![Message::user("MY NAME IS Bob")];
        assert_eq!(PatternFactExtractor.extract(&history), vec!["User's name is Bob."]);
    }

    #[test]
    fn assistant_messages_are_ignored() {
        let history = vec![
            Message::assistant("My name is Gemini and I live in the cloud"),
            Message::user("hello"),
        ];
        assert!(PatternFactExtractor.extract(&history).is_empty());
    }

    #[test]
    fn only_first_match_per_pattern_per_message() {
        let history = vec![Message::user("my name is Ann, no wait, my name is Beth")];
        assert_eq!(PatternFactExtractor.extract(&history), vec!["User's name is Ann."]);
    }

    #[test]
    fn repeated_facts_are_not_deduplicated() {
        let history = vec![
            Message::user("I live in Paris"),
            Message::assistant("Nice."),
            Message::user("As I said, I live in Paris"),
        ];
        assert_eq!(
            PatternFactExtractor.extract(&history),
            vec!["User lives in Paris.", "User lives in Paris."]
        );
    }

    #[test]
    fn negation_is_a_known_false_positive() {
        let history = vec![Message::user("my name is not important")];
        assert_eq!(
            PatternFactExtractor.extract(&history),
            vec!["User's name is not important."]
        );
    }

    #[test]
    fn extraction_is_idempotent() {
        let history = vec![
            Message::user("My name is Carol"),
            Message::user("i live in Lisbon, Portugal"),
        ];
        let first = PatternFactExtractor.extract(&history);
        let second = PatternFactExtractor.extract(&history);
        assert_eq!(first, second);
        assert_eq!(first, vec!["User's name is Carol.", "User lives in Lisbon."]);
    }
}
