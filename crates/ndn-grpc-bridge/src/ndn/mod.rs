// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! NDN endpoint adapters.
//!
//! The bridge talks to NDN through the [`NdnFace`] trait. [`LocalForwarder`]
//! provides an in-process forwarder (FIB, PIT and content store) whose faces
//! implement that trait; [`NdnConsumer`] and [`NdnProducer`] sit on top of a
//! face and expose the consumer and producer contracts the bridge needs.

mod consumer;
mod face;
mod forwarder;
mod packet;
mod producer;

pub use consumer::{InterestOutcome, NdnConsumer};
pub use face::{FaceError, NdnFace};
pub use forwarder::{ForwarderConfig, ForwarderStats, LocalFace, LocalForwarder};
pub use packet::{Data, Interest};
pub use producer::{InterestHandler, NdnProducer};

use std::fmt;

/// Reason an Interest was negatively acknowledged.
///
/// Raw NACK codes from the network layer are mapped onto this closed set;
/// unknown codes are treated as [`NackReason::NoRoute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NackReason {
    /// Upstream is congested.
    Congestion,
    /// No FIB entry matches the Interest name.
    NoRoute,
    /// The Interest's forwarding hint matches no route.
    ForwardingHintInvalid,
    /// No forwarding strategy could handle the Interest.
    NoStrategy,
}

impl NackReason {
    pub(crate) const CONGESTION: u64 = 50;
    pub(crate) const NO_ROUTE: u64 = 150;
    pub(crate) const FORWARDING_HINT_INVALID: u64 = 160;
    pub(crate) const NO_STRATEGY: u64 = 170;

    /// Map a raw NACK code.
    pub fn from_code(code: u64) -> Self {
        match code {
            Self::CONGESTION => Self::Congestion,
            Self::FORWARDING_HINT_INVALID => Self::ForwardingHintInvalid,
            Self::NO_STRATEGY => Self::NoStrategy,
            _ => Self::NoRoute,
        }
    }

    /// Raw NACK code.
    pub fn code(self) -> u64 {
        match self {
            Self::Congestion => Self::CONGESTION,
            Self::NoRoute => Self::NO_ROUTE,
            Self::ForwardingHintInvalid => Self::FORWARDING_HINT_INVALID,
            Self::NoStrategy => Self::NO_STRATEGY,
        }
    }
}

impl fmt::Display for NackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Congestion => "congestion",
            Self::NoRoute => "no route",
            Self::ForwardingHintInvalid => "forwarding hint invalid",
            Self::NoStrategy => "no strategy",
        };
        f.write_str(s)
    }
}
