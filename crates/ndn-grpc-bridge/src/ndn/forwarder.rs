// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process NDN forwarder.
//!
//! Faces obtained from a [`LocalForwarder`] share one FIB, PIT and content
//! store. Interests are forwarded by longest-prefix match to the face that
//! registered the prefix. Identical Interests are never aggregated: each one
//! is forwarded and gets its own PIT entry.

use super::face::{FaceError, NdnFace};
use super::packet::{Data, Interest};
use super::NackReason;
use crate::name::Name;
use async_trait::async_trait;
use dashmap::DashMap;
use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, trace, warn};

/// Forwarder limits.
#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    /// Content store capacity (packets).
    pub content_store_capacity: usize,
    /// PIT size at which new Interests are NACKed for congestion.
    pub max_pending_interests: usize,
    /// Per-route queue of undelivered Interests.
    pub route_queue_capacity: usize,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            content_store_capacity: 1024,
            max_pending_interests: 4096,
            route_queue_capacity: 64,
        }
    }
}

/// Forwarder statistics snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwarderStats {
    pub interests: u64,
    pub satisfied: u64,
    pub cache_hits: u64,
    pub nacks: u64,
    pub timeouts: u64,
    pub unsolicited: u64,
    pub pending: usize,
    pub cached: usize,
}

#[derive(Debug, Default)]
struct Counters {
    interests: AtomicU64,
    satisfied: AtomicU64,
    cache_hits: AtomicU64,
    nacks: AtomicU64,
    timeouts: AtomicU64,
    unsolicited: AtomicU64,
}

struct FibEntry {
    face_id: u64,
    tx: mpsc::Sender<Interest>,
}

struct PitEntry {
    name: Name,
    can_be_prefix: bool,
    reply: oneshot::Sender<Data>,
}

impl PitEntry {
    fn matches(&self, data: &Data) -> bool {
        if self.can_be_prefix {
            self.name.is_prefix_of(&data.name)
        } else {
            self.name == data.name
        }
    }
}

struct CsEntry {
    data: Data,
    arrived: Instant,
}

impl CsEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.arrived) < self.data.freshness_period
    }
}

struct ForwarderInner {
    config: ForwarderConfig,
    fib: RwLock<HashMap<Name, FibEntry>>,
    pit: DashMap<u64, PitEntry>,
    cs: Mutex<LruCache<Name, CsEntry>>,
    next_token: AtomicU64,
    next_face: AtomicU64,
    counters: Counters,
}

/// Removes a PIT entry when the expressing future completes or is dropped.
struct PitGuard<'a> {
    pit: &'a DashMap<u64, PitEntry>,
    token: u64,
}

impl Drop for PitGuard<'_> {
    fn drop(&mut self) {
        self.pit.remove(&self.token);
    }
}

impl ForwarderInner {
    fn fib_lookup(&self, name: &Name) -> Option<mpsc::Sender<Interest>> {
        let fib = self.fib.read();
        (0..=name.len())
            .rev()
            .find_map(|n| fib.get(&name.prefix(n)))
            .map(|entry| entry.tx.clone())
    }

    fn cs_lookup(&self, interest: &Interest) -> Option<Data> {
        let now = Instant::now();
        let usable = |entry: &CsEntry| !interest.must_be_fresh || entry.is_fresh(now);
        let mut cs = self.cs.lock();

        if !interest.can_be_prefix {
            return cs
                .get(&interest.name)
                .filter(|&entry| usable(entry))
                .map(|entry| entry.data.clone());
        }

        let hit = cs
            .iter()
            .find(|&(name, entry)| interest.name.is_prefix_of(name) && usable(entry))
            .map(|(name, _)| name.clone())?;
        cs.get(&hit).map(|entry| entry.data.clone())
    }

    fn nack(&self, code: u64, name: &Name) -> FaceError {
        self.counters.nacks.fetch_add(1, Ordering::Relaxed);
        debug!(
            "NACK {} for {} ({})",
            code,
            name,
            NackReason::from_code(code)
        );
        FaceError::Nack(code)
    }

    async fn forward(&self, mut interest: Interest) -> Result<Data, FaceError> {
        self.counters.interests.fetch_add(1, Ordering::Relaxed);

        if interest.app_params.is_none() {
            if let Some(data) = self.cs_lookup(&interest) {
                self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
                trace!("Content store hit for {}", interest.name);
                return Ok(data);
            }
        }

        if let Some(ref hint) = interest.forwarding_hint {
            if self.fib_lookup(hint).is_none() {
                return Err(self.nack(NackReason::FORWARDING_HINT_INVALID, &interest.name));
            }
        }

        let Some(tx) = self.fib_lookup(&interest.name) else {
            return Err(self.nack(NackReason::NO_ROUTE, &interest.name));
        };

        if self.pit.len() >= self.config.max_pending_interests {
            return Err(self.nack(NackReason::CONGESTION, &interest.name));
        }

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = oneshot::channel();
        self.pit.insert(
            token,
            PitEntry {
                name: interest.name.clone(),
                can_be_prefix: interest.can_be_prefix,
                reply: reply_tx,
            },
        );
        let _pit = PitGuard {
            pit: &self.pit,
            token,
        };

        let name = interest.name.clone();
        let lifetime = interest.lifetime;
        interest.pit_token = Some(token);
        match tx.try_send(interest) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                return Err(self.nack(NackReason::CONGESTION, &name));
            }
            Err(TrySendError::Closed(_)) => {
                return Err(self.nack(NackReason::NO_ROUTE, &name));
            }
        }

        match tokio::time::timeout(lifetime, reply_rx).await {
            Ok(Ok(data)) => Ok(data),
            Ok(Err(_)) => Err(FaceError::Closed),
            Err(_) => {
                self.counters.timeouts.fetch_add(1, Ordering::Relaxed);
                debug!("Interest {} timed out after {:?}", name, lifetime);
                Err(FaceError::Timeout)
            }
        }
    }

    fn publish(&self, mut data: Data) {
        let reply_to = data.pit_token.take();
        self.cs.lock().put(
            data.name.clone(),
            CsEntry {
                data: data.clone(),
                arrived: Instant::now(),
            },
        );

        // A tagged reply belongs to one Interest only, even if others are
        // pending for the same name with different parameters.
        let tokens: Vec<u64> = match reply_to {
            Some(token) => self
                .pit
                .get(&token)
                .filter(|entry| entry.value().matches(&data))
                .map(|_| vec![token])
                .unwrap_or_default(),
            None => self
                .pit
                .iter()
                .filter(|entry| entry.value().matches(&data))
                .map(|entry| *entry.key())
                .collect(),
        };

        if tokens.is_empty() {
            self.counters.unsolicited.fetch_add(1, Ordering::Relaxed);
            debug!("Unsolicited Data {} cached", data.name);
            return;
        }

        for token in tokens {
            if let Some((_, entry)) = self.pit.remove(&token) {
                if entry.reply.send(data.clone()).is_ok() {
                    self.counters.satisfied.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }
}

/// In-process forwarder.
#[derive(Clone)]
pub struct LocalForwarder {
    inner: Arc<ForwarderInner>,
}

impl LocalForwarder {
    pub fn new(config: ForwarderConfig) -> Self {
        let capacity = NonZeroUsize::new(config.content_store_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(ForwarderInner {
                config,
                fib: RwLock::new(HashMap::new()),
                pit: DashMap::new(),
                cs: Mutex::new(LruCache::new(capacity)),
                next_token: AtomicU64::new(1),
                next_face: AtomicU64::new(1),
                counters: Counters::default(),
            }),
        }
    }

    /// Create a new face. It starts disconnected.
    pub fn face(&self) -> LocalFace {
        let (connected, _) = watch::channel(false);
        LocalFace {
            id: self.inner.next_face.fetch_add(1, Ordering::Relaxed),
            inner: self.inner.clone(),
            connected,
            routes: Mutex::new(Vec::new()),
        }
    }

    /// Number of Interests awaiting Data.
    pub fn pending_interests(&self) -> usize {
        self.inner.pit.len()
    }

    /// Drop every cached packet.
    pub fn clear_content_store(&self) {
        self.inner.cs.lock().clear();
    }

    pub fn stats(&self) -> ForwarderStats {
        let c = &self.inner.counters;
        ForwarderStats {
            interests: c.interests.load(Ordering::Relaxed),
            satisfied: c.satisfied.load(Ordering::Relaxed),
            cache_hits: c.cache_hits.load(Ordering::Relaxed),
            nacks: c.nacks.load(Ordering::Relaxed),
            timeouts: c.timeouts.load(Ordering::Relaxed),
            unsolicited: c.unsolicited.load(Ordering::Relaxed),
            pending: self.inner.pit.len(),
            cached: self.inner.cs.lock().len(),
        }
    }
}

impl Default for LocalForwarder {
    fn default() -> Self {
        Self::new(ForwarderConfig::default())
    }
}

/// Face attached to a [`LocalForwarder`].
pub struct LocalFace {
    id: u64,
    inner: Arc<ForwarderInner>,
    connected: watch::Sender<bool>,
    routes: Mutex<Vec<Name>>,
}

impl LocalFace {
    /// Mark the face connected.
    pub fn connect(&self) {
        self.connected.send_replace(true);
        debug!("Face {} connected", self.id);
    }

    pub fn disconnect(&self) {
        self.connected.send_replace(false);
        debug!("Face {} disconnected", self.id);
    }

    /// Prefixes registered through this face.
    pub fn routes(&self) -> Vec<Name> {
        self.routes.lock().clone()
    }
}

#[async_trait]
impl NdnFace for LocalFace {
    async fn express_interest(&self, interest: Interest) -> Result<Data, FaceError> {
        if !self.is_connected() {
            return Err(FaceError::NotConnected);
        }
        self.inner.forward(interest).await
    }

    fn put_data(&self, data: Data) -> Result<(), FaceError> {
        if !self.is_connected() {
            return Err(FaceError::NotConnected);
        }
        self.inner.publish(data);
        Ok(())
    }

    async fn register_route(&self, prefix: Name) -> Result<mpsc::Receiver<Interest>, FaceError> {
        if !self.is_connected() {
            return Err(FaceError::NotConnected);
        }

        let (tx, rx) = mpsc::channel(self.inner.config.route_queue_capacity.max(1));
        let previous = self.inner.fib.write().insert(
            prefix.clone(),
            FibEntry {
                face_id: self.id,
                tx,
            },
        );
        if previous.is_some() {
            warn!("Replacing existing FIB entry for {}", prefix);
        }
        info!("Registered prefix {} on face {}", prefix, self.id);
        self.routes.lock().push(prefix);
        Ok(rx)
    }

    fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    async fn wait_connected(&self) {
        let mut rx = self.connected.subscribe();
        // The sender lives as long as `self`, so this only ends once connected.
        let _ = rx.wait_for(|connected| *connected).await;
    }
}

impl Drop for LocalFace {
    fn drop(&mut self) {
        let routes = std::mem::take(&mut *self.routes.lock());
        if routes.is_empty() {
            return;
        }
        let mut fib = self.inner.fib.write();
        for prefix in routes {
            if fib.get(&prefix).is_some_and(|e| e.face_id == self.id) {
                fib.remove(&prefix);
            }
        }
    }
}

/// A forwarder with two connected faces.
#[cfg(test)]
pub(crate) fn connected_pair(config: ForwarderConfig) -> (LocalForwarder, LocalFace, LocalFace) {
    let forwarder = LocalForwarder::new(config);
    let consumer = forwarder.face();
    let producer = forwarder.face();
    consumer.connect();
    producer.connect();
    (forwarder, consumer, producer)
}
