// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! gRPC client adapter.

use super::proto::simple_service_client::SimpleServiceClient;
use super::proto::DataMessage;
use crate::broker::{CallOutcome, OutboundAdapter, OutboundRequest};
use crate::codec::{self, Envelope};
use crate::ndn::NackReason;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, info};

const READY_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// gRPC client errors.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("gRPC error: {code:?} - {message}")]
    Status { code: tonic::Code, message: String },
}

impl RpcError {
    /// Status code for status errors.
    pub fn code(&self) -> Option<tonic::Code> {
        match self {
            Self::Status { code, .. } => Some(*code),
            Self::InvalidEndpoint { .. } => None,
        }
    }
}

impl From<tonic::Status> for RpcError {
    fn from(status: tonic::Status) -> Self {
        Self::Status {
            code: status.code(),
            message: status.message().to_string(),
        }
    }
}

/// A unary `Process` client.
#[async_trait]
pub trait UnaryClient: Send + Sync + 'static {
    async fn process(&self, request: DataMessage, timeout: Duration) -> Result<DataMessage, RpcError>;

    /// Resolve once the server is reachable.
    async fn wait_ready(&self) {}
}

/// Tonic-backed `SimpleService` client.
///
/// The channel connects lazily; construct it inside a tokio runtime.
#[derive(Clone)]
pub struct GrpcClient {
    endpoint: Endpoint,
    client: SimpleServiceClient<Channel>,
    target: String,
}

impl GrpcClient {
    /// Client for `host` (`host:port`, or a full URI).
    pub fn new(host: &str, connect_timeout: Duration) -> Result<Self, RpcError> {
        let target = if host.contains("://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        };
        let endpoint = Endpoint::from_shared(target.clone())
            .map_err(|e| RpcError::InvalidEndpoint {
                endpoint: target.clone(),
                reason: e.to_string(),
            })?
            .connect_timeout(connect_timeout);
        let client = SimpleServiceClient::new(endpoint.connect_lazy());

        Ok(Self {
            endpoint,
            client,
            target,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Send one `(value, payload)` request.
    pub async fn call(
        &self,
        value: i64,
        payload: &str,
        timeout: Duration,
    ) -> Result<Envelope, RpcError> {
        let response = self.process(DataMessage::new(value, payload), timeout).await?;
        Ok(Envelope::from(response))
    }
}

#[async_trait]
impl UnaryClient for GrpcClient {
    async fn process(&self, message: DataMessage, timeout: Duration) -> Result<DataMessage, RpcError> {
        let mut request = tonic::Request::new(message);
        request.set_timeout(timeout);

        let mut client = self.client.clone();
        let response = tokio::time::timeout(timeout, client.process(request))
            .await
            .map_err(|_| RpcError::Status {
                code: tonic::Code::DeadlineExceeded,
                message: format!("no response from {} within {:?}", self.target, timeout),
            })??;
        Ok(response.into_inner())
    }

    async fn wait_ready(&self) {
        loop {
            match self.endpoint.connect().await {
                Ok(_) => {
                    info!("gRPC server {} reachable", self.target);
                    return;
                }
                Err(e) => {
                    debug!("gRPC server {} not reachable yet: {}", self.target, e);
                    tokio::time::sleep(READY_POLL_INTERVAL).await;
                }
            }
        }
    }
}

/// Outbound adapter issuing gRPC calls for brokered requests.
///
/// The request payload is decoded as an envelope and sent as `Data`; the
/// response is re-encoded for the caller.
pub struct RpcOutbound {
    client: Arc<dyn UnaryClient>,
    timeout: Duration,
}

impl RpcOutbound {
    pub fn new(client: Arc<dyn UnaryClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    fn call_timeout(&self, request: &OutboundRequest) -> Duration {
        self.timeout.min(request.lifetime)
    }
}

#[async_trait]
impl OutboundAdapter for RpcOutbound {
    fn protocol(&self) -> &'static str {
        "gRPC"
    }

    fn protocol_timeout(&self, request: &OutboundRequest) -> Duration {
        self.call_timeout(request)
    }

    async fn wait_ready(&self) {
        self.client.wait_ready().await;
    }

    async fn dispatch(&self, request: OutboundRequest) -> CallOutcome {
        let timeout = self.call_timeout(&request);
        let envelope = codec::decode(&request.payload);
        debug!(
            "gRPC call for {}: value={}, payload={:?}",
            request.target, envelope.numeric, envelope.text
        );

        match self.client.process(DataMessage::from(&envelope), timeout).await {
            Ok(response) => CallOutcome::Fulfilled(codec::encode(&Envelope::from(response))),
            Err(e) => match e.code() {
                Some(tonic::Code::NotFound) => CallOutcome::Nacked(NackReason::NoRoute),
                Some(tonic::Code::DeadlineExceeded) => CallOutcome::TimedOut,
                Some(tonic::Code::Unavailable) => CallOutcome::NotReady,
                _ => CallOutcome::AdapterError(e.to_string()),
            },
        }
    }
}
