// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Protobuf messages and generated service stubs for `bidirectional.SimpleService`.
//!
//! ```proto
//! service SimpleService { rpc Process (Data) returns (Data); }
//! message Data { int64 value = 1; string payload = 2; }
//! ```

use crate::codec::Envelope;

/// The `Data` message exchanged by `SimpleService.Process`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct DataMessage {
    #[prost(int64, tag = "1")]
    pub value: i64,
    #[prost(string, tag = "2")]
    pub payload: String,
}

impl DataMessage {
    pub fn new(value: i64, payload: impl Into<String>) -> Self {
        Self {
            value,
            payload: payload.into(),
        }
    }
}

impl From<DataMessage> for Envelope {
    fn from(message: DataMessage) -> Self {
        Envelope::new(message.value, message.payload)
    }
}

impl From<&Envelope> for DataMessage {
    fn from(envelope: &Envelope) -> Self {
        Self::new(envelope.numeric, envelope.text.clone())
    }
}

include!(concat!(env!("OUT_DIR"), "/bidirectional.SimpleService.rs"));
