// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! NDN consumer adapter.

use super::face::{FaceError, NdnFace};
use super::packet::Interest;
use super::NackReason;
use crate::broker::{CallOutcome, OutboundAdapter, OutboundRequest};
use crate::name::Name;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Result of expressing one Interest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterestOutcome {
    Content(Bytes),
    Nack(NackReason),
    Timeout,
    /// The face is not connected yet.
    NotConnected,
    Failed(String),
}

/// Sends Interests and classifies the result.
#[derive(Clone)]
pub struct NdnConsumer {
    face: Arc<dyn NdnFace>,
}

impl NdnConsumer {
    pub fn new(face: Arc<dyn NdnFace>) -> Self {
        Self { face }
    }

    /// Express an Interest for `name`.
    ///
    /// `app_params` are attached when present; `must_be_fresh` disables
    /// answers from stale cached Data.
    pub async fn submit(
        &self,
        name: Name,
        app_params: Option<Bytes>,
        lifetime: Duration,
        must_be_fresh: bool,
    ) -> InterestOutcome {
        let mut interest = Interest::new(name)
            .with_lifetime(lifetime)
            .must_be_fresh(must_be_fresh);
        interest.app_params = app_params;
        self.express(interest).await
    }

    pub async fn express(&self, interest: Interest) -> InterestOutcome {
        let name = interest.name.clone();
        debug!(
            "Sending Interest: {}, MustBeFresh={}, Lifetime={:?}",
            name, interest.must_be_fresh, interest.lifetime
        );

        match self.face.express_interest(interest).await {
            Ok(data) => {
                info!("Received Data: {} ({} bytes)", data.name, data.content.len());
                InterestOutcome::Content(data.content)
            }
            Err(FaceError::Nack(code)) => {
                let reason = NackReason::from_code(code);
                warn!("Interest {} NACKed: {} (code {})", name, reason, code);
                InterestOutcome::Nack(reason)
            }
            Err(FaceError::Timeout) => {
                warn!("Interest {} timed out", name);
                InterestOutcome::Timeout
            }
            Err(FaceError::NotConnected) => InterestOutcome::NotConnected,
            Err(e) => InterestOutcome::Failed(e.to_string()),
        }
    }

    pub fn face(&self) -> &Arc<dyn NdnFace> {
        &self.face
    }
}

#[async_trait]
impl OutboundAdapter for NdnConsumer {
    fn protocol(&self) -> &'static str {
        "NDN"
    }

    fn protocol_timeout(&self, request: &OutboundRequest) -> Duration {
        request.lifetime
    }

    async fn wait_ready(&self) {
        self.face.wait_connected().await;
    }

    async fn dispatch(&self, request: OutboundRequest) -> CallOutcome {
        let params = (!request.payload.is_empty()).then_some(request.payload);
        let outcome = self
            .submit(request.target, params, request.lifetime, request.must_bypass_cache)
            .await;
        match outcome {
            InterestOutcome::Content(content) => CallOutcome::Fulfilled(content),
            InterestOutcome::Nack(reason) => CallOutcome::Nacked(reason),
            InterestOutcome::Timeout => CallOutcome::TimedOut,
            InterestOutcome::NotConnected => CallOutcome::NotReady,
            InterestOutcome::Failed(msg) => CallOutcome::AdapterError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ndn::forwarder::connected_pair;
    use crate::ndn::{Data, ForwarderConfig, LocalForwarder};

    fn name(s: &str) -> Name {
        s.parse().expect("name")
    }

    #[tokio::test]
    async fn test_content_outcome() {
        let (_fwd, consumer, producer) = connected_pair(ForwarderConfig::default());
        let mut rx = producer.register_route(name("/c")).await.expect("register");
        tokio::spawn(async move {
            if let Some(interest) = rx.recv().await {
                let _ = producer.put_data(Data::new(interest.name, "content"));
            }
        });

        let consumer = NdnConsumer::new(Arc::new(consumer));
        let outcome = consumer
            .submit(name("/c/1"), None, Duration::from_millis(500), false)
            .await;
        assert_eq!(outcome, InterestOutcome::Content(Bytes::from_static(b"content")));
    }

    #[tokio::test]
    async fn test_nack_outcome() {
        let (_fwd, consumer, _producer) = connected_pair(ForwarderConfig::default());
        let consumer = NdnConsumer::new(Arc::new(consumer));
        let outcome = consumer
            .submit(name("/missing"), None, Duration::from_millis(500), false)
            .await;
        assert_eq!(outcome, InterestOutcome::Nack(NackReason::NoRoute));
    }

    #[tokio::test]
    async fn test_timeout_outcome() {
        let (_fwd, consumer, producer) = connected_pair(ForwarderConfig::default());
        let _rx = producer.register_route(name("/slow")).await.expect("register");
        let consumer = NdnConsumer::new(Arc::new(consumer));
        let outcome = consumer
            .submit(name("/slow/1"), None, Duration::from_millis(20), false)
            .await;
        assert_eq!(outcome, InterestOutcome::Timeout);
    }

    #[tokio::test]
    async fn test_not_connected_maps_to_not_ready() {
        let forwarder = LocalForwarder::default();
        let consumer = NdnConsumer::new(Arc::new(forwarder.face()));
        let request = OutboundRequest::new(name("/x"), Bytes::new(), Duration::from_millis(50));
        assert_eq!(consumer.dispatch(request).await, CallOutcome::NotReady);
    }
}
