// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! End-to-end bridge tests
//!
//! Each test runs a bridge node with a real tonic server on an ephemeral
//! loopback port and talks to it through the gRPC client or an extra NDN face.

use async_trait::async_trait;
use bytes::Bytes;
use ndn_grpc_bridge::codec::{self, Envelope, RequestEnvelope, ResponseEnvelope};
use ndn_grpc_bridge::config::{RouteConfig, RouteSpec};
use ndn_grpc_bridge::handlers::HandlerRegistry;
use ndn_grpc_bridge::ndn::{Interest, InterestHandler, NdnFace};
use ndn_grpc_bridge::rpc::{self, GrpcClient, RequestForwarder};
use ndn_grpc_bridge::{BridgeConfig, BridgeContext, BridgeResult};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// A gRPC server running in the background until dropped.
struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl TestServer {
    async fn start<F: RequestForwarder>(forwarder: Arc<F>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            rpc::serve_with_listener(listener, forwarder, async {
                let _ = rx.await;
            })
            .await
            .expect("serve");
        });
        Self {
            addr,
            shutdown: Some(tx),
            task,
        }
    }

    fn client(&self) -> GrpcClient {
        GrpcClient::new(&self.addr.to_string(), CALL_TIMEOUT).expect("client")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.task.abort();
    }
}

/// Downstream gRPC service used as the target of forward routes.
struct Doubler;

#[async_trait]
impl RequestForwarder for Doubler {
    async fn forward(&self, request: RequestEnvelope) -> BridgeResult<ResponseEnvelope> {
        Ok(Envelope::new(
            request.numeric * 2,
            format!("doubled {}", request.text),
        ))
    }
}

/// Handler that answers well after any reasonable Interest lifetime.
struct Sleepy;

#[async_trait]
impl InterestHandler for Sleepy {
    async fn handle(&self, _interest: &Interest) -> BridgeResult<Bytes> {
        tokio::time::sleep(Duration::from_secs(2)).await;
        Ok(Bytes::from_static(b"too late"))
    }
}

fn base_config() -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.server.routes = vec![
        RouteSpec::Prefix("/example".into()),
        RouteSpec::Detailed(RouteConfig::custom("/grpc/process", "process")),
    ];
    config
        .server
        .data
        .insert("/example/data".into(), "Hello from NDN Server!".into());
    config.client.interests = vec!["/grpc/process".into()];
    config
}

async fn start_bridge(config: BridgeConfig) -> (Arc<BridgeContext>, TestServer) {
    let bridge = Arc::new(BridgeContext::start(config).await.expect("bridge"));
    let server = TestServer::start(bridge.grpc_to_ndn()).await;
    (bridge, server)
}

#[tokio::test]
async fn test_grpc_request_processed_over_ndn() {
    let (bridge, server) = start_bridge(base_config()).await;
    let client = server.client();

    let response = client.call(1, "data1", CALL_TIMEOUT).await.expect("response");
    assert_eq!(response.numeric, 2);
    assert_eq!(response.text, "Processed: data1");

    for i in 2..=4 {
        let payload = format!("data{}", i);
        let response = client.call(i, &payload, CALL_TIMEOUT).await.expect("response");
        assert_eq!(response.numeric, i + 1);
        assert_eq!(response.text, format!("Processed: {}", payload));
    }

    assert_eq!(bridge.grpc_to_ndn().broker().in_flight(), 0);
    assert_eq!(bridge.forwarder().pending_interests(), 0);
}

#[tokio::test]
async fn test_static_route_not_found_content() {
    let (bridge, _server) = start_bridge(base_config()).await;
    let face = bridge.forwarder().face();
    face.connect();

    let interest = |name: &str| {
        Interest::new(name.parse().expect("name")).with_lifetime(Duration::from_secs(2))
    };

    let data = face
        .express_interest(interest("/example/notfound"))
        .await
        .expect("data");
    assert_eq!(&data.content[..], b"Data not found for /example/notfound");

    let data = face
        .express_interest(interest("/example/data"))
        .await
        .expect("data");
    assert_eq!(&data.content[..], b"Hello from NDN Server!");
    assert_eq!(data.freshness_period, Duration::from_secs(10));
}

#[tokio::test]
async fn test_static_route_not_found_over_grpc() {
    let mut config = base_config();
    config.client.interests = vec!["/example/notfound".into()];
    config.client.append_request_to_name = false;
    let (_bridge, server) = start_bridge(config).await;

    let response = server
        .client()
        .call(1, "data1", CALL_TIMEOUT)
        .await
        .expect("response");
    assert_eq!(response.numeric, 0);
    assert_eq!(response.text, "Data not found for /example/notfound");
}

#[tokio::test]
async fn test_no_interests_configured() {
    let mut config = base_config();
    config.client.interests.clear();
    let (_bridge, server) = start_bridge(config).await;

    let err = server
        .client()
        .call(1, "data1", CALL_TIMEOUT)
        .await
        .expect_err("status");
    assert_eq!(err.code(), Some(tonic::Code::Internal));
    assert!(err.to_string().contains("No interests configured"));
}

#[tokio::test]
async fn test_unserved_prefix_maps_to_not_found() {
    let mut config = base_config();
    config.client.interests = vec!["/nobody/serves/this".into()];
    let (_bridge, server) = start_bridge(config).await;

    let err = server
        .client()
        .call(1, "x", CALL_TIMEOUT)
        .await
        .expect_err("status");
    assert_eq!(err.code(), Some(tonic::Code::NotFound));
}

#[tokio::test]
async fn test_ndn_timeout_maps_to_deadline_exceeded() {
    let mut config = base_config();
    config
        .server
        .routes
        .push(RouteSpec::Detailed(RouteConfig::custom("/slow", "sleepy")));
    config.client.interests = vec!["/slow".into()];
    config.client.interest_lifetime_ms = 100;
    config.broker.grace_margin_ms = 100;

    let mut handlers = HandlerRegistry::default();
    handlers.register("sleepy", Arc::new(Sleepy));
    let bridge = Arc::new(
        BridgeContext::builder(config)
            .handlers(handlers)
            .build()
            .await
            .expect("bridge"),
    );
    let server = TestServer::start(bridge.grpc_to_ndn()).await;

    let err = server
        .client()
        .call(1, "x", CALL_TIMEOUT)
        .await
        .expect_err("status");
    assert_eq!(err.code(), Some(tonic::Code::DeadlineExceeded));
    assert_eq!(bridge.grpc_to_ndn().broker().in_flight(), 0);
}

#[tokio::test]
async fn test_timed_out_calls_leave_no_state() {
    let mut config = base_config();
    config
        .server
        .routes
        .push(RouteSpec::Detailed(RouteConfig::custom("/slow", "sleepy")));
    config.client.interests = vec!["/slow".into()];
    config.client.interest_lifetime_ms = 100;
    config.broker.grace_margin_ms = 50;

    let mut handlers = HandlerRegistry::default();
    handlers.register("sleepy", Arc::new(Sleepy));
    let bridge = Arc::new(
        BridgeContext::builder(config)
            .handlers(handlers)
            .build()
            .await
            .expect("bridge"),
    );
    let server = TestServer::start(bridge.grpc_to_ndn()).await;
    let client = server.client();

    let calls: Vec<_> = (0..50)
        .map(|i| {
            let client = client.clone();
            tokio::spawn(async move { client.call(i, "leak", CALL_TIMEOUT).await })
        })
        .collect();
    for call in calls {
        let err = call.await.expect("join").expect_err("timeout");
        assert_eq!(err.code(), Some(tonic::Code::DeadlineExceeded));
    }

    let stats = bridge.stats();
    assert_eq!(stats.ndn_calls.in_flight, 0);
    assert_eq!(stats.ndn_calls.timed_out, 50);

    // Interests still in the PIT expire on their own lifetime.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(bridge.forwarder().pending_interests(), 0);
}

#[tokio::test]
async fn test_identical_requests_not_coalesced() {
    let (bridge, server) = start_bridge(base_config()).await;
    let client = server.client();

    let calls: Vec<_> = (0..5)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.call(7, "same", CALL_TIMEOUT).await })
        })
        .collect();
    for call in calls {
        let response = call.await.expect("join").expect("response");
        assert_eq!(response.numeric, 8);
    }

    let stats = bridge.stats();
    assert_eq!(stats.ndn_calls.submitted, 5);
    assert_eq!(stats.forwarder.cache_hits, 0);
    let process = stats
        .routes
        .iter()
        .find(|r| r.prefix.to_string() == "/grpc/process")
        .expect("route");
    assert_eq!(process.interests_served, 5);
}

#[tokio::test]
async fn test_longest_prefix_route_selected() {
    let mut config = base_config();
    config
        .server
        .routes
        .push(RouteSpec::Detailed(RouteConfig::custom("/example/echo", "echo")));
    let (bridge, _server) = start_bridge(config).await;

    let face = bridge.forwarder().face();
    face.connect();
    let interest = Interest::new("/example/echo/3/hi".parse().expect("name"))
        .with_lifetime(Duration::from_secs(2));
    let data = face.express_interest(interest).await.expect("data");
    assert_eq!(codec::decode(&data.content), Envelope::new(3, "hi"));
}

#[tokio::test]
async fn test_forward_route_calls_grpc() {
    let downstream = TestServer::start(Arc::new(Doubler)).await;

    let mut config = BridgeConfig::default();
    config.server.routes = vec![RouteSpec::Detailed(
        RouteConfig::forward("/bridge/grpc").freshness_ms(0),
    )];
    config.grpc.client.host = downstream.addr.to_string();
    let bridge = BridgeContext::start(config).await.expect("bridge");
    assert!(bridge.rpc_broker().is_some());

    let face = bridge.forwarder().face();
    face.connect();
    let interest = Interest::new("/bridge/grpc/20/hi".parse().expect("name"))
        .with_lifetime(Duration::from_secs(3));
    let data = face.express_interest(interest).await.expect("data");
    assert_eq!(codec::decode(&data.content), Envelope::new(40, "doubled hi"));

    let rpc = bridge.rpc_broker().expect("rpc broker").stats();
    assert_eq!(rpc.fulfilled, 1);
    assert_eq!(rpc.in_flight, 0);
}

#[tokio::test]
async fn test_grpc_to_ndn_to_grpc_chain() {
    let downstream = TestServer::start(Arc::new(Doubler)).await;

    let mut config = BridgeConfig::default();
    config.server.routes = vec![RouteSpec::Detailed(
        RouteConfig::forward("/bridge/grpc").freshness_ms(0),
    )];
    config.client.interests = vec!["/bridge/grpc".into()];
    config.grpc.client.host = downstream.addr.to_string();
    let (_bridge, server) = start_bridge(config).await;

    let response = server
        .client()
        .call(21, "chain", CALL_TIMEOUT)
        .await
        .expect("response");
    assert_eq!(response.numeric, 42);
    assert_eq!(response.text, "doubled chain");
}
