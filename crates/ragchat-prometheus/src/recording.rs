// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; with no recorder installed every helper is a
//! no-op, which keeps library crates and tests free of exporter setup.

use metrics::{describe_counter, describe_histogram};

/// Register all ragchat metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!("ragchat_turns_total", "Chat turns by final state");
    describe_counter!("ragchat_fragments_total", "Model output fragments streamed");
    describe_counter!(
        "ragchat_retrieval_failures_total",
        "Turns answered without knowledge-base context because retrieval failed"
    );
    describe_counter!(
        "ragchat_memory_scoring_failures_total",
        "Turns answered without memory facts because fact embedding failed"
    );
    describe_counter!("ragchat_outbox_total", "Outbox messages by result");
    describe_histogram!("ragchat_turn_latency_seconds", "End-to-end chat turn latency");
}

/// Record a finished turn (`complete` or `failed`).
pub fn record_turn(state: &str, seconds: f64) {
    metrics::counter!("ragchat_turns_total", "state" => state.to_string()).increment(1);
    metrics::histogram!("ragchat_turn_latency_seconds").record(seconds);
}

/// Record one streamed fragment.
pub fn record_fragment() {
    metrics::counter!("ragchat_fragments_total").increment(1);
}

/// Record a degraded retrieval.
pub fn record_retrieval_failure() {
    metrics::counter!("ragchat_retrieval_failures_total").increment(1);
}

/// Record a failed memory embedding batch.
pub fn record_memory_scoring_failure() {
    metrics::counter!("ragchat_memory_scoring_failures_total").increment(1);
}

/// Record an outbox outcome (`persisted`, `dropped`, `failed`).
pub fn record_outbox(result: &'static str) {
    metrics::counter!("ragchat_outbox_total", "result" => result).increment(1);
}
