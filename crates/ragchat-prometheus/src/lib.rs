// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus metrics for ragchat.
//!
//! Uses the metrics-rs facade with the Prometheus exporter. Metrics are
//! rendered in Prometheus text format through the gateway's `/metrics` route.

pub mod recording;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use ragchat_core::RagchatError;

pub use recording::{
    record_fragment, record_memory_scoring_failure, record_outbox, record_retrieval_failure,
    record_turn,
};

/// Installed Prometheus recorder.
pub struct PrometheusAdapter {
    handle: PrometheusHandle,
}

impl PrometheusAdapter {
    /// Install the Prometheus recorder globally.
    ///
    /// Only one recorder can be installed per process; a second call fails.
    pub fn new() -> Result<Self, RagchatError> {
        let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
            RagchatError::Internal(format!("failed to install Prometheus recorder: {e}"))
        })?;

        recording::register_metrics();
        tracing::info!("prometheus metrics recorder installed");

        Ok(Self { handle })
    }

    /// Handle for rendering, cheap to clone into request handlers.
    pub fn handle(&self) -> PrometheusHandle {
        self.handle.clone()
    }

    /// Render all collected metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}
