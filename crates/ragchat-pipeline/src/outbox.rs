// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! At-most-once, best-effort persistence of chat messages.
//!
//! Producers call [`OutboxHandle::submit`], which never blocks and never
//! fails the caller. A single worker task writes queued messages through the
//! [`StorageAdapter`]. Failed writes are logged and counted, not retried.

use std::sync::Arc;

use ragchat_core::StorageAdapter;
use ragchat_core::types::Role;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A message waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMessage {
    pub role: Role,
    pub content: String,
}

/// Result of [`OutboxHandle::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
    Queued,
    /// The queue was full or the worker has stopped.
    Dropped,
}

/// Counters reported by the worker when it exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutboxStats {
    pub persisted: u64,
    pub failed: u64,
}

/// Cloneable producer side of the outbox.
#[derive(Debug, Clone)]
pub struct OutboxHandle {
    tx: mpsc::Sender<PendingMessage>,
}

impl OutboxHandle {
    /// Queues a message for persistence.
    pub fn submit(&self, role: Role, content: impl Into<String>) -> Submitted {
        let message = PendingMessage {
            role,
            content: content.into(),
        };
        match self.tx.try_send(message) {
            Ok(()) => Submitted::Queued,
            Err(TrySendError::Full(m)) => {
                warn!(role = %m.role, "outbox full, dropping message");
                ragchat_prometheus::record_outbox("dropped");
                Submitted::Dropped
            }
            Err(TrySendError::Closed(m)) => {
                warn!(role = %m.role, "outbox closed, dropping message");
                ragchat_prometheus::record_outbox("dropped");
                Submitted::Dropped
            }
        }
    }
}

/// Owner of the outbox worker.
pub struct Outbox {
    handle: OutboxHandle,
    cancel: CancellationToken,
    worker: JoinHandle<OutboxStats>,
}

impl Outbox {
    /// Starts the worker with a queue of `capacity` messages.
    pub fn spawn(storage: Arc<dyn StorageAdapter>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let cancel = CancellationToken::new();
        let worker = tokio::spawn(run_worker(storage, rx, cancel.clone()));
        Self {
            handle: OutboxHandle { tx },
            cancel,
            worker,
        }
    }

    pub fn handle(&self) -> OutboxHandle {
        self.handle.clone()
    }

    /// Stops accepting messages, writes everything already queued and
    /// returns the worker's counters.
    pub async fn shutdown(self) -> OutboxStats {
        self.cancel.cancel();
        match self.worker.await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "outbox worker terminated abnormally");
                OutboxStats::default()
            }
        }
    }
}

async fn run_worker(
    storage: Arc<dyn StorageAdapter>,
    mut rx: mpsc::Receiver<PendingMessage>,
    cancel: CancellationToken,
) -> OutboxStats {
    let mut stats = OutboxStats::default();
    loop {
        tokio::select! {
            biased;
            message = rx.recv() => match message {
                Some(message) => persist(storage.as_ref(), message, &mut stats).await,
                None => break,
            },
            _ = cancel.cancelled() => {
                rx.close();
                while let Some(message) = rx.recv().await {
                    persist(storage.as_ref(), message, &mut stats).await;
                }
                break;
            }
        }
    }
    info!(persisted = stats.persisted, failed = stats.failed, "outbox drained");
    stats
}

async fn persist(storage: &dyn StorageAdapter, message: PendingMessage, stats: &mut OutboxStats) {
    match storage.insert_message(message.role, &message.content).await {
        Ok(stored) => {
            stats.persisted += 1;
            ragchat_prometheus::record_outbox("persisted");
            debug!(id = %stored.id, role = %stored.role, "message persisted");
        }
        Err(e) => {
            stats.failed += 1;
            ragchat_prometheus::record_outbox("failed");
            warn!(error = %e, role = %message.role, "failed to persist message");
        }
    }
}
