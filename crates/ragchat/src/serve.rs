// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ragchat serve` command implementation.
//!
//! Wires the adapters, serves the HTTP gateway until SIGINT/SIGTERM, then
//! drains the persistence outbox and closes storage.

use std::sync::Arc;
use std::time::Duration;

use ragchat_auth::SessionRegistry;
use ragchat_config::RagchatConfig;
use ragchat_core::RagchatError;
use ragchat_pipeline::shutdown::{drain_outbox, install_signal_handler};
use ragchat_prometheus::PrometheusAdapter;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::app::{MetricsRender, build_app};

/// How long shutdown waits for queued messages to be written.
const OUTBOX_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Interval between sweeps of expired login sessions.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Runs the `ragchat serve` command.
pub async fn run_serve(config: RagchatConfig) -> Result<(), RagchatError> {
    init_tracing(&config.server.log_level);

    info!("starting ragchat serve");

    let prometheus_render: Option<MetricsRender> = match PrometheusAdapter::new() {
        Ok(adapter) => {
            let handle = adapter.handle();
            let render: MetricsRender = Arc::new(move || handle.render());
            Some(render)
        }
        Err(e) => {
            warn!(error = %e, "prometheus initialization failed, continuing without metrics");
            None
        }
    };

    let app = build_app(&config, prometheus_render).await.map_err(|e| {
        error!(error = %e, "failed to initialize ragchat");
        e
    })?;

    let cancel = install_signal_handler();

    let sessions = app.state.credentials.sessions().clone();
    tokio::spawn(session_sweeper(sessions, cancel.clone()));

    let served = ragchat_gateway::start_server(
        &config.server.host,
        config.server.port,
        app.state,
        cancel.clone(),
    )
    .await;
    // A bind failure returns before any signal; stop the sweeper either way.
    cancel.cancel();

    match drain_outbox(app.outbox, OUTBOX_DRAIN_TIMEOUT).await {
        Some(stats) => info!(
            persisted = stats.persisted,
            failed = stats.failed,
            "outbox drained"
        ),
        None => warn!("outbox did not drain before timeout, queued messages lost"),
    }

    if let Err(e) = app.storage.close().await {
        warn!(error = %e, "failed to close storage cleanly");
    }

    served?;
    info!("ragchat serve shutdown complete");
    Ok(())
}

/// Periodically drops expired login sessions.
async fn session_sweeper(sessions: Arc<SessionRegistry>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let removed = sessions.purge_expired();
                if removed > 0 {
                    debug!(removed, remaining = sessions.len(), "expired sessions purged");
                }
            }
            _ = cancel.cancelled() => {
                debug!("session sweeper shutting down");
                break;
            }
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so `ragchat ask` can stream the answer on stdout.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ragchat={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
