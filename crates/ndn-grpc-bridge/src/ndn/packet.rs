// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Interest and Data packets.

use crate::name::Name;
use bytes::Bytes;
use std::time::Duration;

/// Default Interest lifetime.
pub const DEFAULT_INTEREST_LIFETIME: Duration = Duration::from_millis(4000);

/// An Interest packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interest {
    pub name: Name,
    /// Application parameters. Interests carrying them bypass the content store.
    pub app_params: Option<Bytes>,
    pub lifetime: Duration,
    /// Only accept Data within its freshness period.
    pub must_be_fresh: bool,
    /// Accept Data whose name extends this Interest's name.
    pub can_be_prefix: bool,
    pub forwarding_hint: Option<Name>,
    /// Hop-by-hop token set by the forwarder on delivery to a producer.
    pub pit_token: Option<u64>,
}

impl Interest {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            app_params: None,
            lifetime: DEFAULT_INTEREST_LIFETIME,
            must_be_fresh: false,
            can_be_prefix: false,
            forwarding_hint: None,
            pit_token: None,
        }
    }

    pub fn with_app_params(mut self, params: impl Into<Bytes>) -> Self {
        self.app_params = Some(params.into());
        self
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn must_be_fresh(mut self, fresh: bool) -> Self {
        self.must_be_fresh = fresh;
        self
    }

    pub fn can_be_prefix(mut self, prefix: bool) -> Self {
        self.can_be_prefix = prefix;
        self
    }

    pub fn with_forwarding_hint(mut self, hint: Name) -> Self {
        self.forwarding_hint = Some(hint);
        self
    }

    /// True if `data` satisfies this Interest by name.
    pub fn matches(&self, data: &Data) -> bool {
        if self.can_be_prefix {
            self.name.is_prefix_of(&data.name)
        } else {
            self.name == data.name
        }
    }
}

/// A Data packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    pub name: Name,
    pub content: Bytes,
    pub freshness_period: Duration,
    /// Token of the Interest this Data answers. A tagged Data satisfies only
    /// that Interest's PIT entry.
    pub pit_token: Option<u64>,
}

impl Data {
    pub fn new(name: Name, content: impl Into<Bytes>) -> Self {
        Self {
            name,
            content: content.into(),
            freshness_period: Duration::ZERO,
            pit_token: None,
        }
    }

    /// Answer to `interest`: same name, carrying its PIT token.
    pub fn reply_to(interest: &Interest, content: impl Into<Bytes>) -> Self {
        let mut data = Self::new(interest.name.clone(), content);
        data.pit_token = interest.pit_token;
        data
    }

    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness_period = freshness;
        self
    }
}
