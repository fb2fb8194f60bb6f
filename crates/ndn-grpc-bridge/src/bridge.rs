// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bridge context.
//!
//! [`BridgeContext`] owns every component of a running bridge node: the NDN
//! faces, the name router, both brokers and the producer. It is built once
//! from a [`BridgeConfig`] and passed explicitly to whatever needs it.
//!
//! Two directions are served:
//!
//! - gRPC -> NDN: `Process(Data)` becomes an Interest under the first
//!   configured client interest (see [`GrpcToNdn`]).
//! - NDN -> gRPC: Interests under `forward` routes become `Process` calls
//!   (see [`RouteDispatcher`]).

use crate::broker::{Broker, BrokerConfig, BrokerStatsSnapshot, CallOutcome, OutboundRequest};
use crate::codec::{self, RequestEnvelope, ResponseEnvelope};
use crate::config::{BridgeConfig, ClientConfig, ConfigError, RouteModeConfig};
use crate::error::{BridgeError, BridgeResult};
use crate::handlers::HandlerRegistry;
use crate::name::Name;
use crate::ndn::{
    ForwarderConfig, ForwarderStats, Interest, InterestHandler, LocalForwarder, NdnConsumer,
    NdnProducer,
};
use crate::route::{RouteEntry, RouteMode, RouteStatsSnapshot};
use crate::router::{DataStore, NameRouter};
use crate::rpc::{self, GrpcClient, RequestForwarder, RpcOutbound, UnaryClient};
use async_trait::async_trait;
use bytes::Bytes;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Forwards gRPC requests into NDN.
pub struct GrpcToNdn {
    broker: Broker<NdnConsumer>,
    client: ClientConfig,
    retry_delay: Duration,
}

impl GrpcToNdn {
    pub fn new(broker: Broker<NdnConsumer>, client: ClientConfig, retry_delay: Duration) -> Self {
        Self {
            broker,
            client,
            retry_delay,
        }
    }

    /// Interest name used for `request`.
    pub fn target_name(&self, request: &RequestEnvelope) -> BridgeResult<Name> {
        let first = self.client.interests.first().ok_or_else(|| {
            BridgeError::ConfigurationMissing("No interests configured".into())
        })?;
        let prefix: Name = first.parse()?;
        if self.client.append_request_to_name {
            Ok(codec::request_name(&prefix, request))
        } else {
            Ok(prefix)
        }
    }

    pub fn broker(&self) -> &Broker<NdnConsumer> {
        &self.broker
    }
}

#[async_trait]
impl RequestForwarder for GrpcToNdn {
    async fn forward(&self, request: RequestEnvelope) -> BridgeResult<ResponseEnvelope> {
        let target = self.target_name(&request)?;
        let outbound = OutboundRequest::new(
            target,
            codec::encode(&request),
            self.client.interest_lifetime(),
        )
        .bypass_cache(self.client.disable_cache);

        let mut outcome = self.broker.call(outbound.clone()).await;
        if outcome == CallOutcome::NotReady {
            warn!(
                "NDN face not connected yet, retrying in {:?}",
                self.retry_delay
            );
            tokio::time::sleep(self.retry_delay).await;
            outcome = self.broker.call(outbound).await;
        }

        let content = outcome.into_result("NDN")?;
        let response = codec::decode(&content);
        info!(
            "Received NDN response: value={}, payload={}",
            response.numeric, response.text
        );
        Ok(response)
    }
}

/// Answers Interests for every served prefix according to its route.
pub struct RouteDispatcher {
    router: Arc<NameRouter>,
    rpc: Option<Arc<Broker<RpcOutbound>>>,
}

impl RouteDispatcher {
    pub fn new(router: Arc<NameRouter>, rpc: Option<Arc<Broker<RpcOutbound>>>) -> Self {
        Self { router, rpc }
    }

    async fn forward_to_rpc(&self, route: &RouteEntry, interest: &Interest) -> BridgeResult<Bytes> {
        let broker = self.rpc.as_ref().ok_or_else(|| {
            BridgeError::ConfigurationMissing(format!(
                "No gRPC client configured for {}",
                route.prefix
            ))
        })?;

        let request = match interest.app_params {
            Some(ref params) => codec::decode(params),
            None => codec::envelope_from_name(&route.prefix, &interest.name).unwrap_or_default(),
        };
        let outbound = OutboundRequest::new(
            interest.name.clone(),
            codec::encode(&request),
            interest.lifetime,
        )
        .bypass_cache(interest.must_be_fresh);

        broker.call(outbound).await.into_result("gRPC")
    }
}

#[async_trait]
impl InterestHandler for RouteDispatcher {
    async fn handle(&self, interest: &Interest) -> BridgeResult<Bytes> {
        let route = self.router.resolve(&interest.name)?;
        let result = match route.mode {
            RouteMode::Static => Ok(self.router.static_content(&route, &interest.name)),
            RouteMode::Custom(ref handler) => handler.handle(interest).await,
            RouteMode::Forward => {
                route.record_forwarded();
                self.forward_to_rpc(&route, interest).await
            }
        };
        match result {
            Ok(ref content) => route.record_served(content.len() as u64),
            Err(_) => route.record_error(),
        }
        result
    }
}

/// Statistics of a running bridge.
#[derive(Debug, Clone)]
pub struct BridgeStats {
    pub forwarder: ForwarderStats,
    pub ndn_calls: BrokerStatsSnapshot,
    pub rpc_calls: Option<BrokerStatsSnapshot>,
    pub routes: Vec<RouteStatsSnapshot>,
}

/// Builder for [`BridgeContext`].
pub struct BridgeBuilder {
    config: BridgeConfig,
    forwarder: Option<LocalForwarder>,
    handlers: HandlerRegistry,
    rpc_client: Option<Arc<dyn UnaryClient>>,
}

impl BridgeBuilder {
    /// Attach to an existing forwarder instead of creating one.
    pub fn forwarder(mut self, forwarder: LocalForwarder) -> Self {
        self.forwarder = Some(forwarder);
        self
    }

    /// Replace the handler registry.
    pub fn handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    /// Use `client` for forward routes instead of connecting to `grpc.client.host`.
    pub fn rpc_client(mut self, client: Arc<dyn UnaryClient>) -> Self {
        self.rpc_client = Some(client);
        self
    }

    /// Validate the configuration and start every component.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn build(self) -> BridgeResult<BridgeContext> {
        let config = self.config;
        config.validate()?;

        let forwarder = self.forwarder.unwrap_or_else(|| {
            LocalForwarder::new(ForwarderConfig {
                content_store_capacity: config.ndn.content_store_capacity,
                max_pending_interests: config.ndn.max_pending_interests,
                ..ForwarderConfig::default()
            })
        });
        if let Some(ref pib) = config.ndn.pib_path {
            info!("Using PIB: {}", pib);
        }
        if let Some(ref tpm) = config.ndn.tpm_path {
            info!("Using TPM: {}", tpm);
        }

        let consumer_face = forwarder.face();
        let producer_face = forwarder.face();
        consumer_face.connect();
        producer_face.connect();

        let router = Arc::new(build_router(&config, &self.handlers)?);
        let broker_config = BrokerConfig::from(&config.broker);

        let needs_rpc = router
            .routes()
            .iter()
            .any(|r| matches!(r.mode, RouteMode::Forward));
        let rpc = if needs_rpc {
            let client = match self.rpc_client {
                Some(client) => client,
                None => Arc::new(
                    GrpcClient::new(&config.grpc.client.host, config.grpc.client.timeout())
                        .map_err(|e| BridgeError::AdapterFault(e.to_string()))?,
                ),
            };
            let adapter = RpcOutbound::new(client, config.grpc.client.timeout());
            Some(Arc::new(Broker::start(adapter, broker_config.clone())?))
        } else {
            None
        };

        let ndn_broker = Broker::start(
            NdnConsumer::new(Arc::new(consumer_face)),
            broker_config,
        )?;
        let grpc_to_ndn = Arc::new(GrpcToNdn::new(
            ndn_broker,
            config.client.clone(),
            Duration::from_millis(config.broker.retry_delay_ms),
        ));

        let producer = NdnProducer::new(Arc::new(producer_face));
        let dispatcher: Arc<dyn InterestHandler> =
            Arc::new(RouteDispatcher::new(router.clone(), rpc.clone()));
        for route in router.routes() {
            producer
                .register_route(route.prefix.clone(), route.freshness_period, dispatcher.clone())
                .await
                .map_err(|e| BridgeError::AdapterFault(e.to_string()))?;
        }

        info!(
            "Bridge ready: {} route(s), {} data item(s), {} interest(s)",
            router.len(),
            router.data().len(),
            config.client.interests.len()
        );

        Ok(BridgeContext {
            config,
            forwarder,
            router,
            producer,
            grpc_to_ndn,
            rpc,
        })
    }
}

fn build_router(config: &BridgeConfig, handlers: &HandlerRegistry) -> BridgeResult<NameRouter> {
    let data = DataStore::from_config(&config.server.data)?;
    let mut router = NameRouter::with_data(data);
    let default_freshness = config.server.freshness_period();

    for spec in &config.server.routes {
        let route = spec.to_config();
        let prefix: Name = route.prefix.parse()?;
        let handler = match (route.mode, route.handler.as_deref()) {
            (RouteModeConfig::Custom, Some(name)) => Some(handlers.get(name).ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "Unknown handler '{}' for route {} (available: {})",
                    name,
                    route.prefix,
                    handlers.names().join(", ")
                ))
            })?),
            _ => None,
        };
        let entry = RouteEntry::from_config(&route, prefix, default_freshness, handler)
            .ok_or_else(|| {
                ConfigError::Invalid(format!("Route {} is custom but names no handler", route.prefix))
            })?;
        router.register(entry);
    }

    Ok(router)
}

/// A running bridge node.
pub struct BridgeContext {
    config: BridgeConfig,
    forwarder: LocalForwarder,
    router: Arc<NameRouter>,
    producer: NdnProducer,
    grpc_to_ndn: Arc<GrpcToNdn>,
    rpc: Option<Arc<Broker<RpcOutbound>>>,
}

impl BridgeContext {
    pub fn builder(config: BridgeConfig) -> BridgeBuilder {
        BridgeBuilder {
            config,
            forwarder: None,
            handlers: HandlerRegistry::default(),
            rpc_client: None,
        }
    }

    /// Build with defaults for everything but the configuration.
    pub async fn start(config: BridgeConfig) -> BridgeResult<Self> {
        Self::builder(config).build().await
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The in-process forwarder; extra faces can be attached to it.
    pub fn forwarder(&self) -> &LocalForwarder {
        &self.forwarder
    }

    pub fn router(&self) -> &NameRouter {
        &self.router
    }

    pub fn grpc_to_ndn(&self) -> Arc<GrpcToNdn> {
        self.grpc_to_ndn.clone()
    }

    /// Broker for NDN -> gRPC calls, if any route forwards.
    pub fn rpc_broker(&self) -> Option<&Broker<RpcOutbound>> {
        self.rpc.as_deref()
    }

    /// Serve the gRPC side on the configured port until `shutdown` resolves.
    pub async fn serve_grpc<S>(&self, shutdown: S) -> BridgeResult<()>
    where
        S: Future<Output = ()>,
    {
        rpc::serve(self.config.grpc.server.port, self.grpc_to_ndn(), shutdown).await
    }

    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            forwarder: self.forwarder.stats(),
            ndn_calls: self.grpc_to_ndn.broker().stats(),
            rpc_calls: self.rpc.as_ref().map(|b| b.stats()),
            routes: self.router.stats(),
        }
    }

    /// Stop serving NDN prefixes.
    pub fn shutdown(&self) {
        self.producer.shutdown();
    }
}
