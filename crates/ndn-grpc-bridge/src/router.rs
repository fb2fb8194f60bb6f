// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Name router.
//!
//! Maps Interest names to the route with the longest matching prefix.
//! Routes and static data are set up at startup; afterwards the router is
//! shared read-only.

use crate::error::{BridgeError, BridgeResult};
use crate::name::{Name, NameError};
use crate::route::{RouteEntry, RouteStatsSnapshot};
use bytes::Bytes;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// Static content keyed by full name.
#[derive(Debug, Clone, Default)]
pub struct DataStore {
    entries: BTreeMap<Name, Bytes>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `name -> content` strings.
    pub fn from_config(data: &BTreeMap<String, String>) -> Result<Self, NameError> {
        let mut store = Self::new();
        for (name, content) in data {
            store.insert(name.parse()?, Bytes::from(content.clone()));
        }
        Ok(store)
    }

    pub fn insert(&mut self, name: Name, content: impl Into<Bytes>) {
        self.entries.insert(name, content.into());
    }

    pub fn get(&self, name: &Name) -> Option<&Bytes> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Longest-prefix name router.
#[derive(Debug, Default)]
pub struct NameRouter {
    routes: HashMap<Name, Arc<RouteEntry>>,
    data: DataStore,
}

impl NameRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: DataStore) -> Self {
        Self {
            routes: HashMap::new(),
            data,
        }
    }

    /// Register a route. An existing route for the same prefix is replaced.
    pub fn register(&mut self, entry: RouteEntry) -> Arc<RouteEntry> {
        let entry = Arc::new(entry);
        if let Some(old) = self.routes.insert(entry.prefix.clone(), entry.clone()) {
            warn!(
                "Route {} replaced ({:?} -> {:?})",
                entry.prefix, old.mode, entry.mode
            );
        } else {
            debug!("Route {} registered ({:?})", entry.prefix, entry.mode);
        }
        entry
    }

    /// Route with the longest prefix of `name`.
    pub fn resolve(&self, name: &Name) -> BridgeResult<Arc<RouteEntry>> {
        (0..=name.len())
            .rev()
            .find_map(|n| self.routes.get(&name.prefix(n)))
            .cloned()
            .ok_or_else(|| BridgeError::RouteNotFound(name.clone()))
    }

    /// Content for `name` on a static route.
    ///
    /// Falls back to the route's own content, then to a not-found message.
    pub fn static_content(&self, route: &RouteEntry, name: &Name) -> Bytes {
        if let Some(content) = self.data.get(name) {
            return content.clone();
        }
        route.record_not_found();
        match route.static_content {
            Some(ref content) => content.clone(),
            None => Bytes::from(format!("Data not found for {}", name)),
        }
    }

    /// Registered routes, ordered by prefix.
    pub fn routes(&self) -> Vec<Arc<RouteEntry>> {
        let mut routes: Vec<_> = self.routes.values().cloned().collect();
        routes.sort_by(|a, b| a.prefix.cmp(&b.prefix));
        routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn data(&self) -> &DataStore {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut DataStore {
        &mut self.data
    }

    /// Statistics for every route.
    pub fn stats(&self) -> Vec<RouteStatsSnapshot> {
        self.routes().iter().map(|r| r.stats.snapshot()).collect()
    }
}
