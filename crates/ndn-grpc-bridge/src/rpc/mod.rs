// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! gRPC endpoint adapters for `bidirectional.SimpleService`.

mod client;
pub mod proto;
mod server;

pub use client::{GrpcClient, RpcError, RpcOutbound, UnaryClient};
pub use proto::DataMessage;
pub use server::{serve, serve_with_listener, BridgeService, RequestForwarder};
