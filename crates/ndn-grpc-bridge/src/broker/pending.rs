// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pending call table.
//!
//! Each in-flight call owns one entry holding the sending half of its result
//! slot. Resolving a call removes the entry and sends the outcome, so exactly
//! one resolver (adapter result or caller deadline) ever wins.

use super::{CallOutcome, CallState};
use crate::name::Name;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;

/// Identifier of one brokered call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallId(pub u64);

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The call was already resolved (or abandoned).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyResolved;

pub(crate) struct PendingCall {
    target: Name,
    created: Instant,
    state: CallState,
    slot: oneshot::Sender<CallOutcome>,
}

/// Table of in-flight calls.
#[derive(Default)]
pub struct PendingTable {
    calls: DashMap<CallId, PendingCall>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, id: CallId, target: Name, slot: oneshot::Sender<CallOutcome>) {
        self.calls.insert(
            id,
            PendingCall {
                target,
                created: Instant::now(),
                state: CallState::Created,
                slot,
            },
        );
    }

    /// Mark a call as handed to its adapter. False if it is gone.
    pub(crate) fn mark_dispatched(&self, id: CallId) -> bool {
        match self.calls.get_mut(&id) {
            Some(mut call) => {
                call.state = CallState::Dispatched;
                true
            }
            None => false,
        }
    }

    /// Resolve a call with `outcome`. Only the first resolution succeeds.
    pub fn resolve(&self, id: CallId, outcome: CallOutcome) -> Result<(), AlreadyResolved> {
        let (_, call) = self.calls.remove(&id).ok_or(AlreadyResolved)?;
        tracing::trace!(
            "Call {} for {} resolved as {:?} after {:?}",
            id,
            call.target,
            outcome.state(),
            call.created.elapsed()
        );
        // The receiver may already be gone if the caller was cancelled.
        let _ = call.slot.send(outcome);
        Ok(())
    }

    /// Drop a call whose caller went away.
    pub(crate) fn abandon(&self, id: CallId) -> bool {
        self.calls.remove(&id).is_some()
    }

    pub fn contains(&self, id: CallId) -> bool {
        self.calls.contains_key(&id)
    }

    pub fn state(&self, id: CallId) -> Option<CallState> {
        self.calls.get(&id).map(|call| call.state)
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

/// Removes a call from the table if the caller drops before it resolves.
pub(crate) struct PendingGuard {
    table: Arc<PendingTable>,
    id: CallId,
}

impl PendingGuard {
    pub(crate) fn new(table: Arc<PendingTable>, id: CallId) -> Self {
        Self { table, id }
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.table.abandon(self.id) {
            tracing::debug!("Call {} abandoned by its caller", self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn target() -> Name {
        "/t".parse().expect("name")
    }

    #[test]
    fn test_single_assignment() {
        let table = PendingTable::new();
        let (tx, mut rx) = oneshot::channel();
        table.insert(CallId(1), target(), tx);
        assert_eq!(table.state(CallId(1)), Some(CallState::Created));

        assert!(table.mark_dispatched(CallId(1)));
        assert_eq!(table.state(CallId(1)), Some(CallState::Dispatched));

        table
            .resolve(CallId(1), CallOutcome::Fulfilled(Bytes::from_static(b"a")))
            .expect("first resolution");
        assert_eq!(
            table.resolve(CallId(1), CallOutcome::TimedOut),
            Err(AlreadyResolved)
        );

        assert_eq!(
            rx.try_recv().expect("value"),
            CallOutcome::Fulfilled(Bytes::from_static(b"a"))
        );
        assert!(table.is_empty());
    }

    #[test]
    fn test_resolve_after_receiver_dropped() {
        let table = PendingTable::new();
        let (tx, rx) = oneshot::channel();
        table.insert(CallId(2), target(), tx);
        drop(rx);
        assert!(table.resolve(CallId(2), CallOutcome::TimedOut).is_ok());
        assert!(table.is_empty());
    }

    #[test]
    fn test_guard_removes_entry() {
        let table = Arc::new(PendingTable::new());
        let (tx, _rx) = oneshot::channel();
        table.insert(CallId(3), target(), tx);
        {
            let _guard = PendingGuard::new(table.clone(), CallId(3));
        }
        assert!(!table.contains(CallId(3)));
        assert!(!table.mark_dispatched(CallId(3)));
    }
}
