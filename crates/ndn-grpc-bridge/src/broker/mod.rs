// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Cross-protocol request broker.
//!
//! A [`Broker`] lets an inbound handler running on one protocol issue an
//! outbound call on another protocol and await its outcome with a deadline.
//!
//! ```text
//! caller ──call()──> [bounded FIFO queue] ──> worker thread ──dispatch()──> adapter
//!   ^                                                                         |
//!   └──────────────── pending table (single-assignment result slot) <─────────┘
//! ```
//!
//! The caller's deadline is `max(lifetime, adapter timeout) + grace margin`.
//! Whichever of the adapter result and the deadline resolves the call first
//! wins; the other is discarded. The pending entry is removed on every path,
//! including cancellation of the caller.

mod pending;
mod worker;

pub use pending::{AlreadyResolved, CallId, PendingTable};

use crate::config::BrokerSettings;
use crate::error::{BridgeError, BridgeResult};
use crate::name::Name;
use crate::ndn::NackReason;
use async_trait::async_trait;
use bytes::Bytes;
use pending::PendingGuard;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, error, warn};
use worker::Job;

/// An outbound call request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub target: Name,
    pub payload: Bytes,
    pub lifetime: Duration,
    pub must_bypass_cache: bool,
}

impl OutboundRequest {
    pub fn new(target: Name, payload: Bytes, lifetime: Duration) -> Self {
        Self {
            target,
            payload,
            lifetime,
            must_bypass_cache: false,
        }
    }

    pub fn bypass_cache(mut self, bypass: bool) -> Self {
        self.must_bypass_cache = bypass;
        self
    }
}

/// Lifecycle state of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Created,
    Dispatched,
    Fulfilled,
    Nacked,
    TimedOut,
    NotReady,
    AdapterError,
}

/// Terminal outcome of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Fulfilled(Bytes),
    Nacked(NackReason),
    TimedOut,
    /// The adapter was not connected when the call was dispatched.
    NotReady,
    AdapterError(String),
}

impl CallOutcome {
    pub fn state(&self) -> CallState {
        match self {
            Self::Fulfilled(_) => CallState::Fulfilled,
            Self::Nacked(_) => CallState::Nacked,
            Self::TimedOut => CallState::TimedOut,
            Self::NotReady => CallState::NotReady,
            Self::AdapterError(_) => CallState::AdapterError,
        }
    }

    /// Convert into a result, naming `protocol` in timeout errors.
    pub fn into_result(self, protocol: &'static str) -> BridgeResult<Bytes> {
        match self {
            Self::Fulfilled(bytes) => Ok(bytes),
            Self::Nacked(reason) => Err(BridgeError::AdapterNack(reason)),
            Self::TimedOut => Err(BridgeError::AdapterTimeout(protocol)),
            Self::NotReady => Err(BridgeError::AdapterNotReady(protocol)),
            Self::AdapterError(msg) => Err(BridgeError::AdapterFault(msg)),
        }
    }
}

/// Outbound side of one protocol.
#[async_trait]
pub trait OutboundAdapter: Send + Sync + 'static {
    /// Protocol name used in logs and errors.
    fn protocol(&self) -> &'static str;

    /// The adapter's own timeout for `request`.
    fn protocol_timeout(&self, request: &OutboundRequest) -> Duration;

    /// Resolve once the adapter can dispatch.
    async fn wait_ready(&self);

    /// Perform the call.
    async fn dispatch(&self, request: OutboundRequest) -> CallOutcome;
}

/// Broker tuning.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub queue_capacity: usize,
    pub grace_margin: Duration,
    pub ready_timeout: Duration,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self::from(&BrokerSettings::default())
    }
}

impl From<&BrokerSettings> for BrokerConfig {
    fn from(settings: &BrokerSettings) -> Self {
        Self {
            queue_capacity: settings.queue_capacity,
            grace_margin: Duration::from_millis(settings.grace_margin_ms),
            ready_timeout: Duration::from_millis(settings.ready_timeout_ms),
        }
    }
}

/// Broker counters.
#[derive(Debug, Default)]
pub struct BrokerStats {
    submitted: AtomicU64,
    fulfilled: AtomicU64,
    nacked: AtomicU64,
    timed_out: AtomicU64,
    not_ready: AtomicU64,
    failed: AtomicU64,
}

impl BrokerStats {
    fn record(&self, outcome: &CallOutcome) {
        let counter = match outcome {
            CallOutcome::Fulfilled(_) => &self.fulfilled,
            CallOutcome::Nacked(_) => &self.nacked,
            CallOutcome::TimedOut => &self.timed_out,
            CallOutcome::NotReady => &self.not_ready,
            CallOutcome::AdapterError(_) => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self, in_flight: usize) -> BrokerStatsSnapshot {
        BrokerStatsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            fulfilled: self.fulfilled.load(Ordering::Relaxed),
            nacked: self.nacked.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            not_ready: self.not_ready.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            in_flight,
        }
    }
}

/// Snapshot of broker statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrokerStatsSnapshot {
    pub submitted: u64,
    pub fulfilled: u64,
    pub nacked: u64,
    pub timed_out: u64,
    pub not_ready: u64,
    pub failed: u64,
    pub in_flight: usize,
}

/// Cross-protocol request broker.
pub struct Broker<A: OutboundAdapter> {
    adapter: Arc<A>,
    config: BrokerConfig,
    queue: mpsc::Sender<Job>,
    table: Arc<PendingTable>,
    stats: BrokerStats,
    next_id: AtomicU64,
}

impl<A: OutboundAdapter> Broker<A> {
    /// Start a broker and its worker thread.
    pub fn start(adapter: A, config: BrokerConfig) -> BridgeResult<Self> {
        let adapter = Arc::new(adapter);
        let (queue, jobs) = mpsc::channel(config.queue_capacity.max(1));
        let table = Arc::new(PendingTable::new());
        worker::spawn(adapter.clone(), jobs, table.clone(), config.ready_timeout)?;

        Ok(Self {
            adapter,
            config,
            queue,
            table,
            stats: BrokerStats::default(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn protocol(&self) -> &'static str {
        self.adapter.protocol()
    }

    /// Caller-side deadline for `request`.
    pub fn deadline_for(&self, request: &OutboundRequest) -> Duration {
        request
            .lifetime
            .max(self.adapter.protocol_timeout(request))
            + self.config.grace_margin
    }

    /// Issue an outbound call and wait for its outcome.
    pub async fn call(&self, request: OutboundRequest) -> CallOutcome {
        let id = CallId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let budget = self.deadline_for(&request);
        let deadline = Instant::now() + budget;
        let target = request.target.clone();

        let (slot, mut rx) = oneshot::channel();
        self.table.insert(id, target.clone(), slot);
        let _guard = PendingGuard::new(self.table.clone(), id);
        self.stats.submitted.fetch_add(1, Ordering::Relaxed);
        debug!(
            "{} call {} -> {} (deadline {:?})",
            self.protocol(),
            id,
            target,
            budget
        );

        let job = Job {
            id,
            request,
            deadline,
        };
        let waited = tokio::time::timeout_at(deadline, async {
            self.queue
                .send(job)
                .await
                .map_err(|_| "broker worker stopped")?;
            (&mut rx).await.map_err(|_| "result slot dropped")
        })
        .await;

        let outcome = match waited {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(reason)) => self.fail(id, reason),
            Err(_) => self.expire(id, &mut rx).await,
        };

        self.stats.record(&outcome);
        match &outcome {
            CallOutcome::Fulfilled(bytes) => {
                debug!("Call {} fulfilled ({} bytes)", id, bytes.len())
            }
            CallOutcome::Nacked(reason) => warn!("Call {} to {} NACKed: {}", id, target, reason),
            CallOutcome::TimedOut => warn!(
                "Call {} to {} timed out after {:?}",
                id, target, budget
            ),
            CallOutcome::NotReady => {
                warn!("Call {} to {}: {} not ready", id, target, self.protocol())
            }
            CallOutcome::AdapterError(msg) => error!("Call {} to {} failed: {}", id, target, msg),
        }
        outcome
    }

    /// Resolve an expired call, unless the adapter got there first.
    async fn expire(&self, id: CallId, rx: &mut oneshot::Receiver<CallOutcome>) -> CallOutcome {
        match self.table.resolve(id, CallOutcome::TimedOut) {
            Ok(()) => CallOutcome::TimedOut,
            Err(AlreadyResolved) => rx.await.unwrap_or(CallOutcome::TimedOut),
        }
    }

    fn fail(&self, id: CallId, reason: &str) -> CallOutcome {
        let outcome = CallOutcome::AdapterError(reason.to_string());
        let _ = self.table.resolve(id, outcome.clone());
        outcome
    }

    /// Number of calls awaiting an outcome.
    pub fn in_flight(&self) -> usize {
        self.table.len()
    }

    pub fn stats(&self) -> BrokerStatsSnapshot {
        self.stats.snapshot(self.table.len())
    }
}
