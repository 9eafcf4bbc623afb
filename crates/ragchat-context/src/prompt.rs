// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Augmented prompt construction.
//!
//! The prompt shape is fixed: preamble, user-only history, retained memory
//! facts, knowledge-base context, then the literal question. Sections are
//! always present even when empty so the model sees the same layout every
//! turn.

use ragchat_core::types::{Message, Role};

/// Instruction line opening every augmented prompt.
pub const PREAMBLE: &str = "You are a helpful assistant. Use the following context, memory, and conversation history to answer the user's question.";

/// Separator placed between knowledge-base chunks.
pub const CHUNK_SEPARATOR: &str = "\n---\n";

/// Index of the last user message in `history`.
pub fn last_user_index(history: &[Message]) -> Option<usize> {
    history.iter().rposition(|m| m.role == Role::User)
}

/// Contents of every user message, one per line.
pub fn user_history(history: &[Message]) -> String {
    history
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the augmented prompt.
pub fn render_prompt(history: &str, facts: &[String], chunks: &[String], question: &str) -> String {
    format!(
        "{PREAMBLE}\n\nConversation history:\n{history}\n\nRelevant memory facts:\n{facts}\n\nKnowledge base context:\n{context}\n\nUser: {question}\nAssistant:",
        facts = facts.join("\n"),
        context = chunks.join(CHUNK_SEPARATOR),
    )
}

/// Copy of `history` with the message at `index` replaced by `prompt`,
/// keeping its role.
pub fn augment_messages(history: &[Message], index: usize, prompt: String) -> Vec<Message> {
    let mut messages = history.to_vec();
    if let Some(target) = messages.get_mut(index) {
        target.content = prompt;
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_layout_is_fixed() {
        let prompt = render_prompt(
            "My name is Alice.\nWhat's my name?",
            &["User's name is Alice.".to_string()],
            &["chunk one".to_string(), "chunk two".to_string()],
            "What's my name?",
        );
        let expected = "You are a helpful assistant. Use the following context, memory, and conversation history to answer the user's question.

Conversation history:
My name is Alice.
What's my name?

Relevant memory facts:
User's name is Alice.

Knowledge base context:
chunk one
---
chunk two

User: What's my name?
Assistant:";
        assert_eq!(prompt, expected);
    }

    #[test]
    fn empty_sections_keep_their_labels() {
        let prompt = render_prompt("hi", &[], &[], "hi");
        assert!(prompt.contains("Relevant memory facts:\n\n\nKnowledge base context:\n\n\nUser: hi"));
    }

    #[test]
    fn user_history_skips_assistant_turns() {
        let history = vec![
            Message::user("one"),
            Message::assistant("reply"),
            Message::user("two"),
        ];
        assert_eq!(user_history(&history), "one\ntwo");
    }

    #[test]
    fn augment_replaces_only_target() {
        let history = vec![Message::user("q1"), Message::assistant("a1"), Message::user("q2")];
        let index = last_user_index(&history).unwrap();
        assert_eq!(index, 2);
        let out = augment_messages(&history, index, "PROMPT".into());
        assert_eq!(out[0], Message::user("q1"));
        assert_eq!(out[1], Message::assistant("a1"));
        assert_eq!(out[2], Message::user("PROMPT"));
    }

    #[test]
    fn no_user_message_has_no_index() {
        assert_eq!(last_user_index(&[Message::assistant("hello")]), None);
        assert_eq!(last_user_index(&[]), None);
    }
}
