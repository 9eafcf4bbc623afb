// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Graceful shutdown coordination with signal handling.
//!
//! Installs handlers for SIGTERM and SIGINT (Ctrl+C), triggering a
//! [`CancellationToken`] that the server monitors. The outbox is drained
//! after the server stops accepting requests.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::outbox::{Outbox, OutboxStats};

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal is received.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => {
                            info!("received SIGINT (Ctrl+C), initiating shutdown");
                        }
                        _ = sigterm.recv() => {
                            info!("received SIGTERM, initiating shutdown");
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler, listening for Ctrl+C only");
                    let _ = ctrl_c.await;
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Drains the outbox, giving up after `timeout`.
pub async fn drain_outbox(outbox: Outbox, timeout: Duration) -> Option<OutboxStats> {
    match tokio::time::timeout(timeout, outbox.shutdown()).await {
        Ok(stats) => Some(stats),
        Err(_) => {
            warn!(?timeout, "outbox drain timed out, queued messages lost");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ragchat_core::types::Role;
    use ragchat_test_utils::MockStorage;

    use super::*;

    #[tokio::test]
    async fn install_signal_handler_returns_token() {
        let token = install_signal_handler();
        assert!(!token.is_cancelled());
        token.cancel();
    }

    #[tokio::test]
    async fn drain_outbox_writes_pending_messages() {
        let storage = MockStorage::new();
        let outbox = Outbox::spawn(Arc::new(storage.clone()), 4);
        outbox.handle().submit(Role::User, "pending");

        let stats = drain_outbox(outbox, Duration::from_secs(5)).await.unwrap();
        assert_eq!(stats.persisted, 1);
    }
}
