// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Broker worker.
//!
//! One worker per broker, on its own thread with a single-threaded runtime.
//! Jobs are taken off the queue in FIFO order and each dispatch runs as a
//! local task, so slow calls do not hold up the ones queued behind them.

use super::pending::{CallId, PendingTable};
use super::{CallOutcome, OutboundAdapter, OutboundRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::LocalSet;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// A queued call.
pub(crate) struct Job {
    pub(crate) id: CallId,
    pub(crate) request: OutboundRequest,
    pub(crate) deadline: Instant,
}

/// Start the worker thread. It exits once every queue sender is dropped.
pub(crate) fn spawn<A: OutboundAdapter>(
    adapter: Arc<A>,
    jobs: mpsc::Receiver<Job>,
    table: Arc<PendingTable>,
    ready_timeout: Duration,
) -> std::io::Result<()> {
    let protocol = adapter.protocol();
    std::thread::Builder::new()
        .name(format!("{}-broker", protocol.to_ascii_lowercase()))
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    error!("{} broker worker failed to start: {}", protocol, e);
                    return;
                }
            };
            let local = LocalSet::new();
            local.block_on(&runtime, run(adapter, jobs, table, ready_timeout));
            debug!("{} broker worker stopped", protocol);
        })?;
    Ok(())
}

async fn run<A: OutboundAdapter>(
    adapter: Arc<A>,
    mut jobs: mpsc::Receiver<Job>,
    table: Arc<PendingTable>,
    ready_timeout: Duration,
) {
    let protocol = adapter.protocol();

    // Calls queue up behind this wait.
    match tokio::time::timeout(ready_timeout, adapter.wait_ready()).await {
        Ok(()) => info!("{} adapter ready", protocol),
        Err(_) => warn!(
            "{} adapter not ready after {:?}, dispatching anyway",
            protocol, ready_timeout
        ),
    }

    while let Some(job) = jobs.recv().await {
        let remaining = job.deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            if table.resolve(job.id, CallOutcome::TimedOut).is_ok() {
                debug!("Call {} expired while queued", job.id);
            }
            continue;
        }
        if !table.mark_dispatched(job.id) {
            debug!("Call {} no longer pending, skipped", job.id);
            continue;
        }

        let adapter = adapter.clone();
        let table = table.clone();
        tokio::task::spawn_local(async move {
            let outcome = tokio::time::timeout(remaining, adapter.dispatch(job.request))
                .await
                .unwrap_or(CallOutcome::TimedOut);
            if table.resolve(job.id, outcome).is_err() {
                debug!("Late {} result for call {} discarded", protocol, job.id);
            }
        });
    }
}
