// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-turn context assembly.

use std::sync::Arc;

use ragchat_core::traits::FactExtractor;
use ragchat_core::types::{Message, ScoredFact};
use ragchat_memory::FactScorer;
use tracing::{debug, info, warn};

use crate::prompt::{augment_messages, last_user_index, render_prompt, user_history};
use crate::retriever::ContextRetriever;

/// Everything computed for one turn before the model is called.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPrompt {
    /// Content of the last user message, if any.
    pub question: Option<String>,
    /// Knowledge-base chunks, closest first. Empty when retrieval failed.
    pub context_chunks: Vec<String>,
    /// Facts found in the history before scoring.
    pub extracted_facts: Vec<String>,
    /// Facts that cleared the similarity threshold, best first.
    pub relevant_facts: Vec<ScoredFact>,
    /// The augmented prompt, or `None` when there is no user message.
    pub prompt: Option<String>,
    /// Messages to send to the model.
    pub messages: Vec<Message>,
}

impl AssembledPrompt {
    /// Knowledge-base chunks as they appear in the prompt.
    pub fn context_text(&self) -> String {
        self.context_chunks.join(crate::prompt::CHUNK_SEPARATOR)
    }
}

/// Builds the augmented message list for a turn.
///
/// Never fails: retrieval and memory scoring errors degrade to an empty
/// knowledge-base section and no memory facts respectively.
pub struct ContextAssembler {
    retriever: ContextRetriever,
    extractor: Arc<dyn FactExtractor>,
    scorer: FactScorer,
}

impl ContextAssembler {
    pub fn new(
        retriever: ContextRetriever,
        extractor: Arc<dyn FactExtractor>,
        scorer: FactScorer,
    ) -> Self {
        Self {
            retriever,
            extractor,
            scorer,
        }
    }

    pub fn retriever(&self) -> &ContextRetriever {
        &self.retriever
    }

    pub async fn assemble(&self, history: &[Message]) -> AssembledPrompt {
        let Some(index) = last_user_index(history) else {
            debug!("no user message in history, sending it unchanged");
            return AssembledPrompt {
                question: None,
                context_chunks: Vec::new(),
                extracted_facts: self.extractor.extract(history),
                relevant_facts: Vec::new(),
                prompt: None,
                messages: history.to_vec(),
            };
        };
        let question = history[index].content.clone();

        let context_chunks = self.retriever.retrieve(&question).await;
        let extracted_facts = self.extractor.extract(history);

        let relevant_facts = match self.scorer.score(&question, &extracted_facts).await {
            Ok(scored) => scored,
            Err(e) => {
                warn!(error = %e, "memory fact embedding failed, answering without memory");
                ragchat_prometheus::record_memory_scoring_failure();
                Vec::new()
            }
        };

        let fact_texts: Vec<String> = relevant_facts.iter().map(|f| f.fact.clone()).collect();
        let prompt = render_prompt(&user_history(history), &fact_texts, &context_chunks, &question);

        info!(
            question = %question,
            context = %context_chunks.join(crate::prompt::CHUNK_SEPARATOR),
            extracted = ?extracted_facts,
            relevant = ?fact_texts,
            "assembled turn context"
        );

        AssembledPrompt {
            messages: augment_messages(history, index, prompt.clone()),
            question: Some(question),
            context_chunks,
            extracted_facts,
            relevant_facts,
            prompt: Some(prompt),
        }
    }
}
