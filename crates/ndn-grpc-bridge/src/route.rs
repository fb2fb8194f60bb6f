// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Route definition and statistics.

use crate::config::{RouteConfig, RouteModeConfig};
use crate::name::Name;
use crate::ndn::InterestHandler;
use bytes::Bytes;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What a route does with matching Interests.
#[derive(Clone)]
pub enum RouteMode {
    /// Answer from the data store.
    Static,
    /// Answer with a registered handler.
    Custom(Arc<dyn InterestHandler>),
    /// Forward as a gRPC call.
    Forward,
}

impl fmt::Debug for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => f.write_str("Static"),
            Self::Custom(_) => f.write_str("Custom"),
            Self::Forward => f.write_str("Forward"),
        }
    }
}

/// A served name prefix.
#[derive(Debug)]
pub struct RouteEntry {
    /// Name prefix.
    pub prefix: Name,

    pub mode: RouteMode,

    /// Returned by static routes when the data store has no entry.
    pub static_content: Option<Bytes>,

    /// Freshness period of produced Data.
    pub freshness_period: Duration,

    /// Route statistics.
    pub stats: Arc<RouteStats>,
}

impl RouteEntry {
    /// Create a route.
    pub fn new(prefix: Name, mode: RouteMode, freshness_period: Duration) -> Self {
        Self {
            stats: Arc::new(RouteStats::new(prefix.clone())),
            prefix,
            mode,
            static_content: None,
            freshness_period,
        }
    }

    /// Create a route from configuration.
    ///
    /// `handler` must be supplied for custom routes.
    pub fn from_config(
        config: &RouteConfig,
        prefix: Name,
        default_freshness: Duration,
        handler: Option<Arc<dyn InterestHandler>>,
    ) -> Option<Self> {
        let mode = match config.mode {
            RouteModeConfig::Static => RouteMode::Static,
            RouteModeConfig::Custom => RouteMode::Custom(handler?),
            RouteModeConfig::Forward => RouteMode::Forward,
        };
        let freshness = config
            .freshness_period_ms
            .map(Duration::from_millis)
            .unwrap_or(default_freshness);

        let mut entry = Self::new(prefix, mode, freshness);
        entry.static_content = config.content.as_ref().map(|c| Bytes::from(c.clone()));
        Some(entry)
    }

    /// Set fallback content.
    pub fn with_static_content(mut self, content: impl Into<Bytes>) -> Self {
        self.static_content = Some(content.into());
        self
    }

    /// Check if this route covers `name`.
    pub fn matches(&self, name: &Name) -> bool {
        self.prefix.is_prefix_of(name)
    }

    /// Record an answered Interest.
    pub fn record_served(&self, bytes: u64) {
        self.stats.interests_served.fetch_add(1, Ordering::Relaxed);
        self.stats.bytes_served.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a data store miss.
    pub fn record_not_found(&self) {
        self.stats.not_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an Interest handed to the gRPC side.
    pub fn record_forwarded(&self) {
        self.stats.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an error.
    pub fn record_error(&self) {
        self.stats.errors.fetch_add(1, Ordering::Relaxed);
    }
}

/// Statistics for a route.
#[derive(Debug)]
pub struct RouteStats {
    pub prefix: Name,

    /// Interests answered.
    pub interests_served: AtomicU64,

    /// Content bytes produced.
    pub bytes_served: AtomicU64,

    /// Static lookups with no stored content.
    pub not_found: AtomicU64,

    /// Interests forwarded as gRPC calls.
    pub forwarded: AtomicU64,

    /// Handler or forwarding errors.
    pub errors: AtomicU64,

    /// Route creation time.
    pub created: Instant,
}

impl RouteStats {
    /// Create new stats.
    pub fn new(prefix: Name) -> Self {
        Self {
            prefix,
            interests_served: AtomicU64::new(0),
            bytes_served: AtomicU64::new(0),
            not_found: AtomicU64::new(0),
            forwarded: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            created: Instant::now(),
        }
    }

    /// Get snapshot of current stats.
    pub fn snapshot(&self) -> RouteStatsSnapshot {
        RouteStatsSnapshot {
            prefix: self.prefix.clone(),
            interests_served: self.interests_served.load(Ordering::Relaxed),
            bytes_served: self.bytes_served.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            uptime_secs: self.created.elapsed().as_secs(),
        }
    }
}

/// Snapshot of route statistics.
#[derive(Debug, Clone)]
pub struct RouteStatsSnapshot {
    pub prefix: Name,
    pub interests_served: u64,
    pub bytes_served: u64,
    pub not_found: u64,
    pub forwarded: u64,
    pub errors: u64,
    pub uptime_secs: u64,
}

impl RouteStatsSnapshot {
    /// Interests answered per second.
    pub fn interests_per_second(&self) -> f64 {
        if self.uptime_secs > 0 {
            self.interests_served as f64 / self.uptime_secs as f64
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeResult;
    use crate::ndn::Interest;
    use async_trait::async_trait;

    struct Nop;

    #[async_trait]
    impl InterestHandler for Nop {
        async fn handle(&self, _interest: &Interest) -> BridgeResult<Bytes> {
            Ok(Bytes::new())
        }
    }

    fn name(s: &str) -> Name {
        s.parse().expect("name")
    }

    #[test]
    fn test_route_from_config() {
        let config = RouteConfig::new("/example").freshness_ms(250);
        let route = RouteEntry::from_config(&config, name("/example"), Duration::from_secs(10), None)
            .expect("static route");

        assert!(matches!(route.mode, RouteMode::Static));
        assert_eq!(route.freshness_period, Duration::from_millis(250));
        assert!(route.matches(&name("/example/data")));
        assert!(!route.matches(&name("/other")));
    }

    #[test]
    fn test_custom_route_needs_handler() {
        let config = RouteConfig::custom("/grpc/process", "process");
        let prefix = name("/grpc/process");
        assert!(RouteEntry::from_config(&config, prefix.clone(), Duration::ZERO, None).is_none());

        let route = RouteEntry::from_config(&config, prefix, Duration::ZERO, Some(Arc::new(Nop)))
            .expect("custom route");
        assert!(matches!(route.mode, RouteMode::Custom(_)));
        assert_eq!(format!("{:?}", route.mode), "Custom");
    }

    #[test]
    fn test_default_freshness_and_content() {
        let mut config = RouteConfig::forward("/bridge");
        config.content = Some("fallback".into());
        let route = RouteEntry::from_config(&config, name("/bridge"), Duration::from_secs(3), None)
            .expect("forward route");
        assert!(matches!(route.mode, RouteMode::Forward));
        assert_eq!(route.freshness_period, Duration::from_secs(3));
        assert_eq!(route.static_content.as_deref(), Some(&b"fallback"[..]));
    }

    #[test]
    fn test_route_stats() {
        let route = RouteEntry::new(name("/s"), RouteMode::Static, Duration::ZERO);

        route.record_served(100);
        route.record_served(200);
        route.record_not_found();
        route.record_error();

        let snapshot = route.stats.snapshot();
        assert_eq!(snapshot.interests_served, 2);
        assert_eq!(snapshot.bytes_served, 300);
        assert_eq!(snapshot.not_found, 1);
        assert_eq!(snapshot.errors, 1);
    }
}
