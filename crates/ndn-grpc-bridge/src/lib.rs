// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! NDN <-> gRPC bridge
//!
//! Translates between Named Data Networking Interest/Data exchanges and gRPC
//! unary calls on `bidirectional.SimpleService/Process`.
//!
//! # Features
//!
//! - **gRPC -> NDN**: each `Process(Data)` call is expressed as an Interest
//!   named `<prefix>/<value>/<payload>` and answered from the returned Data
//! - **NDN -> gRPC**: Interests under `forward` routes become `Process` calls
//! - **Name Routing**: longest-prefix match to static content, named handlers
//!   or cross-protocol forwarding
//! - **Request Broker**: bounded queue, deadline per call, no leaked state on
//!   timeout or cancellation
//!
//! # Quick Start
//!
//! ```bash
//! # Run a bridge node
//! ndn-grpc-bridge --config config.yaml server
//!
//! # Send the configured test data to it
//! ndn-grpc-bridge --config config.yaml client
//! ```
//!
//! # Configuration File
//!
//! ```yaml
//! server:
//!   routes:
//!     - /example
//!     - prefix: /grpc/process
//!       mode: custom
//!       handler: process
//!   data:
//!     /example/data: "Hello from NDN Server!"
//! client:
//!   interests: ["/grpc/process"]
//!   interest_lifetime: 4000
//! grpc:
//!   server:
//!     port: 50051
//! ```

pub mod bridge;
pub mod broker;
pub mod codec;
pub mod config;
pub mod error;
pub mod handlers;
pub mod name;
pub mod ndn;
pub mod route;
pub mod router;
pub mod rpc;

pub use bridge::{BridgeContext, BridgeStats, GrpcToNdn, RouteDispatcher};
pub use broker::{Broker, BrokerConfig, CallOutcome, OutboundAdapter, OutboundRequest};
pub use codec::{Envelope, RequestEnvelope, ResponseEnvelope};
pub use config::{BridgeConfig, ConfigError, ConfigOverrides, Mode};
pub use error::{BridgeError, BridgeResult};
pub use handlers::HandlerRegistry;
pub use name::{Component, Name, NameError};
pub use route::{RouteEntry, RouteMode, RouteStats, RouteStatsSnapshot};
pub use router::{DataStore, NameRouter};
