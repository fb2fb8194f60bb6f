// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Connection to an NDN forwarder.

use super::packet::{Data, Interest};
use crate::name::Name;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Face errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FaceError {
    /// The face has not finished connecting.
    #[error("Cannot send packet before connected")]
    NotConnected,

    /// The Interest was negatively acknowledged with a raw reason code.
    #[error("Interest NACKed (reason code {0})")]
    Nack(u64),

    /// No Data arrived within the Interest lifetime.
    #[error("Interest timed out")]
    Timeout,

    #[error("Face closed")]
    Closed,
}

/// A face onto the NDN network.
#[async_trait]
pub trait NdnFace: Send + Sync + 'static {
    /// Express an Interest and wait for the matching Data.
    async fn express_interest(&self, interest: Interest) -> Result<Data, FaceError>;

    /// Publish Data, satisfying pending Interests.
    fn put_data(&self, data: Data) -> Result<(), FaceError>;

    /// Register a prefix; Interests under it are delivered on the returned channel.
    async fn register_route(&self, prefix: Name) -> Result<mpsc::Receiver<Interest>, FaceError>;

    /// True once the face can send packets.
    fn is_connected(&self) -> bool;

    /// Resolve once the face is connected.
    async fn wait_connected(&self);
}
