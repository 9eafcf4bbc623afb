// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-turn state machine.
//!
//! A turn goes through `Idle -> ContextFetching -> ModelStreaming -> Complete`.
//! Any provider failure moves it to `Failed`, which is surfaced to the caller
//! as [`FALLBACK_MESSAGE`] instead of an error.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, Stream, StreamExt};
use ragchat_context::ContextAssembler;
use ragchat_core::types::{Message, ProviderRequest, Role};
use ragchat_core::{FragmentStream, ProviderAdapter};
use serde::Serialize;
use strum::Display;
use tracing::{debug, info, warn};

use crate::outbox::OutboxHandle;

/// Assistant text shown when a turn fails.
pub const FALLBACK_MESSAGE: &str = "Sorry, there was an error. Please try again";

/// States in the turn FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TurnState {
    /// No turn in progress.
    Idle,
    /// Retrieving knowledge-base context and scoring memory facts.
    ContextFetching,
    /// Consuming the model's fragment stream.
    ModelStreaming,
    /// The stream was exhausted; the buffer is the answer.
    Complete,
    /// The model call failed; the fallback message is the answer.
    Failed,
}

/// Events observed by a turn's consumer, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnEvent {
    /// The turn entered a new state.
    State(TurnState),
    /// A fragment arrived. `content` is the accumulated answer so far.
    Delta { fragment: String, content: String },
    /// Final answer of a completed turn.
    Completed { content: String },
    /// The turn failed; `content` is the fallback text.
    Failed { content: String, reason: String },
}

/// Stream of [`TurnEvent`]s for one turn.
pub type TurnStream = Pin<Box<dyn Stream<Item = TurnEvent> + Send>>;

/// Summary of a drained turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// `Complete` or `Failed`.
    pub state: TurnState,
    /// The assistant message shown to the user.
    pub content: String,
}

/// Drives chat turns: context assembly, then a streamed model call.
///
/// Cheap to clone; every turn gets its own copy.
#[derive(Clone)]
pub struct ChatPipeline {
    assembler: Arc<ContextAssembler>,
    provider: Arc<dyn ProviderAdapter>,
    model: String,
    outbox: Option<OutboxHandle>,
}

impl ChatPipeline {
    pub fn new(
        assembler: Arc<ContextAssembler>,
        provider: Arc<dyn ProviderAdapter>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            assembler,
            provider,
            model: model.into(),
            outbox: None,
        }
    }

    /// Persist the question and the final answer of every turn.
    pub fn with_outbox(mut self, outbox: OutboxHandle) -> Self {
        self.outbox = Some(outbox);
        self
    }

    pub fn assembler(&self) -> &ContextAssembler {
        &self.assembler
    }

    /// Starts a turn over `history` and returns its event stream.
    ///
    /// The stream is lazy: nothing happens until it is polled.
    pub fn stream_turn(&self, history: Vec<Message>) -> TurnStream {
        let task = TurnTask {
            pipeline: self.clone(),
            started: Instant::now(),
            question: None,
            phase: Phase::Start(history),
        };
        Box::pin(stream::unfold(task, TurnTask::advance))
    }

    /// Runs a turn to completion.
    pub async fn run_turn(&self, history: Vec<Message>) -> TurnOutcome {
        let mut events = self.stream_turn(history);
        let mut outcome = TurnOutcome {
            state: TurnState::Idle,
            content: String::new(),
        };
        while let Some(event) = events.next().await {
            match event {
                TurnEvent::Completed { content } => {
                    outcome = TurnOutcome {
                        state: TurnState::Complete,
                        content,
                    };
                }
                TurnEvent::Failed { content, .. } => {
                    outcome = TurnOutcome {
                        state: TurnState::Failed,
                        content,
                    };
                }
                TurnEvent::State(_) | TurnEvent::Delta { .. } => {}
            }
        }
        outcome
    }

    fn submit(&self, role: Role, content: &str) {
        if let Some(outbox) = &self.outbox {
            outbox.submit(role, content);
        }
    }
}

enum Phase {
    Start(Vec<Message>),
    Assemble(Vec<Message>),
    Open(Vec<Message>),
    Streaming {
        fragments: FragmentStream,
        content: String,
    },
    Complete(String),
    Fail(String),
    Done,
}

struct TurnTask {
    pipeline: ChatPipeline,
    started: Instant,
    question: Option<String>,
    phase: Phase,
}

impl TurnTask {
    async fn advance(mut self) -> Option<(TurnEvent, Self)> {
        let phase = std::mem::replace(&mut self.phase, Phase::Done);
        let event = match phase {
            Phase::Start(history) => {
                debug!(messages = history.len(), "turn started");
                self.phase = Phase::Assemble(history);
                TurnEvent::State(TurnState::ContextFetching)
            }
            Phase::Assemble(history) => {
                let assembled = self.pipeline.assembler.assemble(&history).await;
                if let Some(question) = &assembled.question {
                    self.pipeline.submit(Role::User, question);
                }
                self.question = assembled.question;
                self.phase = Phase::Open(assembled.messages);
                TurnEvent::State(TurnState::ModelStreaming)
            }
            Phase::Open(messages) => {
                let request = ProviderRequest {
                    model: self.pipeline.model.clone(),
                    messages,
                };
                match self.pipeline.provider.stream(request).await {
                    Ok(fragments) => self.next_fragment(fragments, String::new()).await,
                    Err(e) => self.fail(e.to_string()),
                }
            }
            Phase::Streaming { fragments, content } => self.next_fragment(fragments, content).await,
            Phase::Complete(content) => {
                self.finish(TurnState::Complete, &content);
                TurnEvent::Completed { content }
            }
            Phase::Fail(reason) => {
                self.finish(TurnState::Failed, FALLBACK_MESSAGE);
                TurnEvent::Failed {
                    content: FALLBACK_MESSAGE.to_string(),
                    reason,
                }
            }
            Phase::Done => return None,
        };
        Some((event, self))
    }

    /// Pulls the next non-empty fragment, or ends the stream.
    async fn next_fragment(&mut self, mut fragments: FragmentStream, mut content: String) -> TurnEvent {
        loop {
            match fragments.next().await {
                Some(Ok(fragment)) if fragment.is_empty() => continue,
                Some(Ok(fragment)) => {
                    content.push_str(&fragment);
                    ragchat_prometheus::record_fragment();
                    let event = TurnEvent::Delta {
                        fragment,
                        content: content.clone(),
                    };
                    self.phase = Phase::Streaming { fragments, content };
                    return event;
                }
                Some(Err(e)) => return self.fail(e.to_string()),
                None => {
                    self.phase = Phase::Complete(content);
                    return TurnEvent::State(TurnState::Complete);
                }
            }
        }
    }

    fn fail(&mut self, reason: String) -> TurnEvent {
        warn!(error = %reason, "model stream failed, answering with fallback");
        self.phase = Phase::Fail(reason);
        TurnEvent::State(TurnState::Failed)
    }

    fn finish(&self, state: TurnState, content: &str) {
        let elapsed = self.started.elapsed().as_secs_f64();
        ragchat_prometheus::record_turn(&state.to_string(), elapsed);
        if self.question.is_some() {
            self.pipeline.submit(Role::Assistant, content);
        }
        info!(state = %state, chars = content.chars().count(), elapsed, "turn finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragchat_context::{ContextRetriever, DEFAULT_TOP_K};
    use ragchat_memory::{DEFAULT_SIMILARITY_THRESHOLD, FactScorer, PatternFactExtractor};
    use ragchat_test_utils::{MockEmbedder, MockProvider, MockStorage, MockVectorStore, StreamScript};

    use crate::outbox::Outbox;

    fn assembler(store: MockVectorStore) -> Arc<ContextAssembler> {
        let embedder = Arc::new(MockEmbedder::new());
        Arc::new(ContextAssembler::new(
            ContextRetriever::new(embedder.clone(), Arc::new(store), DEFAULT_TOP_K, "Document"),
            Arc::new(PatternFactExtractor),
            FactScorer::new(embedder, DEFAULT_SIMILARITY_THRESHOLD),
        ))
    }

    fn pipeline(provider: MockProvider) -> ChatPipeline {
        ChatPipeline::new(
            assembler(MockVectorStore::with_chunks(&["kb chunk"])),
            Arc::new(provider),
            "gemini-1.5-flash",
        )
    }

    fn history() -> Vec<Message> {
        vec![Message::user("Hi there")]
    }

    #[tokio::test]
    async fn fragments_accumulate_into_the_answer() {
        let p = pipeline(MockProvider::with_fragments(&["Hel", "lo"]));
        let events: Vec<TurnEvent> = p.stream_turn(history()).collect().await;

        assert_eq!(
            events,
            vec![
                TurnEvent::State(TurnState::ContextFetching),
                TurnEvent::State(TurnState::ModelStreaming),
                TurnEvent::Delta {
                    fragment: "Hel".into(),
                    content: "Hel".into()
                },
                TurnEvent::Delta {
                    fragment: "lo".into(),
                    content: "Hello".into()
                },
                TurnEvent::State(TurnState::Complete),
                TurnEvent::Completed {
                    content: "Hello".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn observed_content_only_grows() {
        let p = pipeline(MockProvider::with_fragments(&["a", "", "bc", "d", "efg"]));
        let contents: Vec<String> = p
            .stream_turn(history())
            .filter_map(|e| async move {
                match e {
                    TurnEvent::Delta { content, .. } => Some(content),
                    _ => None,
                }
            })
            .collect()
            .await;

        assert_eq!(contents.len(), 4);
        for pair in contents.windows(2) {
            assert!(pair[1].starts_with(&pair[0]));
        }
        assert_eq!(contents.last().unwrap(), "abcdefg");
    }

    #[tokio::test]
    async fn open_failure_yields_fallback() {
        let provider = MockProvider::with_scripts(vec![StreamScript::FailOnOpen("boom".into())]);
        let outcome = pipeline(provider).run_turn(history()).await;

        assert_eq!(outcome.state, TurnState::Failed);
        assert_eq!(outcome.content, FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn mid_stream_failure_discards_partial_answer() {
        let provider = MockProvider::with_scripts(vec![StreamScript::FailAfter(
            vec!["partial".into()],
            "connection reset".into(),
        )]);
        let events: Vec<TurnEvent> = pipeline(provider).stream_turn(history()).collect().await;

        assert!(events.contains(&TurnEvent::State(TurnState::Failed)));
        match events.last().unwrap() {
            TurnEvent::Failed { content, reason } => {
                assert_eq!(content, FALLBACK_MESSAGE);
                assert!(reason.contains("connection reset"));
            }
            other => panic!("unexpected last event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn vector_store_failure_still_reaches_streaming() {
        let provider = MockProvider::with_fragments(&["ok"]);
        let p = ChatPipeline::new(
            assembler(MockVectorStore::failing()),
            Arc::new(provider.clone()),
            "gemini-1.5-flash",
        );
        let events: Vec<TurnEvent> = p.stream_turn(history()).collect().await;

        assert!(events.contains(&TurnEvent::State(TurnState::ModelStreaming)));
        let requests = provider.requests().await;
        assert!(requests[0].messages[0]
            .content
            .contains("Knowledge base context:\n\n\nUser: Hi there"));
    }

    #[tokio::test]
    async fn provider_receives_augmented_history_and_model() {
        let provider = MockProvider::with_fragments(&["x"]);
        let p = ChatPipeline::new(
            assembler(MockVectorStore::with_chunks(&["kb chunk"])),
            Arc::new(provider.clone()),
            "gemini-1.5-flash",
        );
        p.run_turn(vec![
            Message::user("first"),
            Message::assistant("reply"),
            Message::user("second"),
        ])
        .await;

        let request = &provider.requests().await[0];
        assert_eq!(request.model, "gemini-1.5-flash");
        assert_eq!(request.messages[0], Message::user("first"));
        assert_eq!(request.messages[1], Message::assistant("reply"));
        assert!(request.messages[2].content.contains("kb chunk"));
        assert!(request.messages[2].content.ends_with("User: second\nAssistant:"));
    }

    #[tokio::test]
    async fn outbox_receives_question_and_answer() {
        let storage = MockStorage::new();
        let outbox = Outbox::spawn(Arc::new(storage.clone()), 8);
        let p = pipeline(MockProvider::with_fragments(&["Hel", "lo"])).with_outbox(outbox.handle());

        p.run_turn(history()).await;
        outbox.shutdown().await;

        let stored = storage.messages().await;
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].role, Role::User);
        assert_eq!(stored[0].content, "Hi there");
        assert_eq!(stored[1].content, "Hello");
    }

    #[test]
    fn turn_state_names_are_snake_case() {
        assert_eq!(TurnState::ModelStreaming.to_string(), "model_streaming");
        assert_eq!(
            serde_json::to_string(&TurnState::ContextFetching).unwrap(),
            "\"context_fetching\""
        );
    }
}
