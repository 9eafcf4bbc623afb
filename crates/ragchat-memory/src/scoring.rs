// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relevance scoring of memory facts against the current question.

use std::sync::Arc;

use futures::future::try_join_all;
use ragchat_core::error::RagchatError;
use ragchat_core::traits::EmbeddingAdapter;
use ragchat_core::types::{Embedding, ScoredFact};
use tracing::debug;

use crate::similarity::checked_similarity;

/// Default relevance threshold. Facts must score strictly above it.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.7;

/// Embeds facts alongside the question and keeps the relevant ones.
pub struct FactScorer {
    embedder: Arc<dyn EmbeddingAdapter>,
    threshold: f32,
}

impl FactScorer {
    pub fn new(embedder: Arc<dyn EmbeddingAdapter>, threshold: f32) -> Self {
        Self {
            embedder,
            threshold,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Scores `facts` against `question` and returns those above the
    /// threshold, best first.
    ///
    /// The question and every fact are embedded concurrently as one batch.
    /// Any single embedding failure fails the whole batch; no partial
    /// scoring happens. With no facts, no embedding request is made.
    pub async fn score(
        &self,
        question: &str,
        facts: &[String],
    ) -> Result<Vec<ScoredFact>, RagchatError> {
        if facts.is_empty() {
            return Ok(Vec::new());
        }

        let requests = std::iter::once(question)
            .chain(facts.iter().map(String::as_str))
            .map(|text| self.embedder.embed(text));
        let mut vectors = try_join_all(requests).await?;
        let question_vector = vectors.remove(0);

        let relevant = retain_relevant(&question_vector, facts, &vectors, self.threshold);
        debug!(
            extracted = facts.len(),
            retained = relevant.len(),
            threshold = self.threshold,
            "scored memory facts"
        );
        Ok(relevant)
    }
}

/// Pairs each fact with its similarity to the question, drops undefined
/// scores and scores at or below `threshold`, and sorts descending.
///
/// The sort is stable, so equal scores keep their extraction order.
pub fn retain_relevant(
    question: &Embedding,
    facts: &[String],
    fact_vectors: &[Embedding],
    threshold: f32,
) -> Vec<ScoredFact> {
    let mut scored: Vec<ScoredFact> = facts
        .iter()
        .zip(fact_vectors)
        .filter_map(|(fact, vector)| {
            let score = checked_similarity(question, vector)?;
            (score > threshold).then(|| ScoredFact {
                fact: fact.clone(),
                score,
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragchat_test_utils::MockEmbedder;

    fn facts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn keeps_only_scores_strictly_above_threshold() {
        let question = vec![1.0, 0.0];
        let facts = facts(&["exact", "orthogonal", "opposite"]);
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, 0.0]];
        let kept = retain_relevant(&question, &facts, &vectors, 0.7);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].fact, "exact");
    }

    #[test]
    fn score_equal_to_threshold_is_dropped() {
        let question = vec![1.0, 0.0];
        let kept = retain_relevant(&question, &facts(&["same"]), &[vec![1.0, 0.0]], 1.0);
        assert!(kept.is_empty());
    }

    #[test]
    fn results_sorted_descending() {
        let question = vec![1.0, 0.0];
        let facts = facts(&["lower", "higher"]);
        // cos = 0.8 and 0.98 respectively
        let vectors = vec![vec![0.8, 0.6], vec![0.98, 0.198_997_5]];
        let kept = retain_relevant(&question, &facts, &vectors, 0.7);
        let order: Vec<&str> = kept.iter().map(|s| s.fact.as_str()).collect();
        assert_eq!(order, vec!["higher", "lower"]);
        assert!(kept[0].score >= kept[1].score);
    }

    #[test]
    fn zero_and_mismatched_vectors_never_retained() {
        let question = vec![1.0, 0.0];
        let facts = facts(&["zero", "short"]);
        let vectors = vec![vec![0.0, 0.0], vec![1.0]];
        assert!(retain_relevant(&question, &facts, &vectors, -1.0).is_empty());
    }

    #[tokio::test]
    async fn no_facts_means_no_embedding_calls() {
        let embedder = Arc::new(MockEmbedder::new());
        let scorer = FactScorer::new(embedder.clone(), DEFAULT_SIMILARITY_THRESHOLD);
        let scored = scorer.score("What's my name?", &[]).await.unwrap();
        assert!(scored.is_empty());
        assert_eq!(embedder.calls().await.len(), 0);
    }

    #[tokio::test]
    async fn embeds_question_and_every_fact() {
        let embedder = Arc::new(
            MockEmbedder::new()
                .with_vector("What's my name?", vec![1.0, 0.0])
                .with_vector("User's name is Alice.", vec![0.9, 0.1])
                .with_vector("User lives in Boston.", vec![0.1, 0.9]),
        );
        let scorer = FactScorer::new(embedder.clone(), DEFAULT_SIMILARITY_THRESHOLD);
        let facts = facts(&["User's name is Alice.", "User lives in Boston."]);

        let scored = scorer.score("What's my name?", &facts).await.unwrap();

        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].fact, "User's name is Alice.");
        assert_eq!(embedder.calls().await.len(), 3);
    }

    #[tokio::test]
    async fn one_failed_embedding_fails_the_batch() {
        let embedder = Arc::new(
            MockEmbedder::new()
                .with_vector("q", vec![1.0, 0.0])
                .with_vector("good fact", vec![1.0, 0.0])
                .failing_on("bad fact"),
        );
        let scorer = FactScorer::new(embedder, DEFAULT_SIMILARITY_THRESHOLD);
        let result = scorer.score("q", &facts(&["good fact", "bad fact"])).await;
        assert!(matches!(result, Err(RagchatError::Embedding { .. })));
    }
}
