// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! gRPC server adapter.

use super::proto::simple_service_server::{SimpleService, SimpleServiceServer};
use super::proto::DataMessage;
use crate::codec::{Envelope, RequestEnvelope, ResponseEnvelope};
use crate::error::BridgeResult;
use async_trait::async_trait;
use std::future::Future;
use std::net::{Ipv6Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic::{Request, Response, Status};
use tracing::{debug, error, info, warn};

/// Handles one inbound `Process` request.
#[async_trait]
pub trait RequestForwarder: Send + Sync + 'static {
    async fn forward(&self, request: RequestEnvelope) -> BridgeResult<ResponseEnvelope>;
}

/// `SimpleService` implementation backed by a [`RequestForwarder`].
pub struct BridgeService<F> {
    forwarder: Arc<F>,
}

impl<F> BridgeService<F> {
    pub fn new(forwarder: Arc<F>) -> Self {
        Self { forwarder }
    }
}

#[tonic::async_trait]
impl<F: RequestForwarder> SimpleService for BridgeService<F> {
    async fn process(
        &self,
        request: Request<DataMessage>,
    ) -> Result<Response<DataMessage>, Status> {
        let message = request.into_inner();
        info!(
            "Received gRPC request: value={}, payload={}",
            message.value, message.payload
        );

        match self.forwarder.forward(Envelope::from(message)).await {
            Ok(response) => {
                debug!(
                    "Responding: value={}, payload={}",
                    response.numeric, response.text
                );
                Ok(Response::new(DataMessage::from(&response)))
            }
            Err(e) => {
                if e.is_local() {
                    warn!("Request not forwarded: {}", e);
                } else {
                    error!("Request failed: {}", e);
                }
                Err(Status::from(&e))
            }
        }
    }
}

/// Serve on `[::]:port` until `shutdown` resolves.
pub async fn serve<F, S>(port: u16, forwarder: Arc<F>, shutdown: S) -> BridgeResult<()>
where
    F: RequestForwarder,
    S: Future<Output = ()>,
{
    let addr = SocketAddr::from((Ipv6Addr::UNSPECIFIED, port));
    let listener = TcpListener::bind(addr).await?;
    serve_with_listener(listener, forwarder, shutdown).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_with_listener<F, S>(
    listener: TcpListener,
    forwarder: Arc<F>,
    shutdown: S,
) -> BridgeResult<()>
where
    F: RequestForwarder,
    S: Future<Output = ()>,
{
    let local = listener.local_addr()?;
    info!("gRPC server started on {}", local);

    Server::builder()
        .add_service(SimpleServiceServer::new(BridgeService::new(forwarder)))
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await?;

    info!("gRPC server on {} stopped", local);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;

    struct Doubler;

    #[async_trait]
    impl RequestForwarder for Doubler {
        async fn forward(&self, request: RequestEnvelope) -> BridgeResult<ResponseEnvelope> {
            if request.text == "fail" {
                return Err(BridgeError::ConfigurationMissing("No interests configured".into()));
            }
            Ok(Envelope::new(request.numeric * 2, request.text))
        }
    }

    #[tokio::test]
    async fn test_process_success() {
        let service = BridgeService::new(Arc::new(Doubler));
        let response = service
            .process(Request::new(DataMessage::new(21, "x")))
            .await
            .expect("response");
        assert_eq!(response.into_inner(), DataMessage::new(42, "x"));
    }

    #[tokio::test]
    async fn test_process_error_status() {
        let service = BridgeService::new(Arc::new(Doubler));
        let status = service
            .process(Request::new(DataMessage::new(1, "fail")))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::Internal);
        assert_eq!(status.message(), "No interests configured");
    }
}
