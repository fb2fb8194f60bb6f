// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire codec for bridged requests and responses.
//!
//! Both sides of the bridge carry the same record: a numeric field and a text
//! field (the gRPC `Data { value, payload }` message). Inside NDN content and
//! Interest application parameters the record travels as a small JSON object:
//!
//! ```json
//! {"value": 1, "payload": "data1"}
//! ```
//!
//! Decoding is total. Bytes that are not a structured record are tried as a
//! plain integer, and anything else becomes opaque text:
//!
//! | input                          | numeric | text                |
//! |--------------------------------|---------|---------------------|
//! | `{"value":2,"payload":"x"}`    | 2       | `x`                 |
//! | `42`                           | 42      | (empty)             |
//! | `Data not found for /a`        | 0       | `Data not found ...`|

use crate::name::{Component, Name};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Codec errors (only reachable through [`decode_structured`]).
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Not a structured record: {0}")]
    NotStructured(#[from] serde_json::Error),

    #[error("Invalid raw payload encoding: {0}")]
    InvalidRaw(#[from] base64::DecodeError),
}

/// Protocol-neutral request/response record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    /// Numeric field (`value` on the wire).
    pub numeric: i64,
    /// Text field (`payload` on the wire).
    pub text: String,
    /// Raw bytes that could not be represented as text.
    pub raw: Option<Bytes>,
}

/// Envelope decoded from an inbound request.
pub type RequestEnvelope = Envelope;

/// Envelope decoded from an outbound call's result.
pub type ResponseEnvelope = Envelope;

impl Envelope {
    /// Create an envelope without raw payload.
    pub fn new(numeric: i64, text: impl Into<String>) -> Self {
        Self {
            numeric,
            text: text.into(),
            raw: None,
        }
    }

    /// Attach raw bytes.
    pub fn with_raw(mut self, raw: impl Into<Bytes>) -> Self {
        self.raw = Some(raw.into());
        self
    }
}

/// On-the-wire record.
#[derive(Debug, Serialize, Deserialize)]
struct WireRecord {
    #[serde(default)]
    value: i64,
    #[serde(default)]
    payload: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    raw: Option<String>,
}

/// Encode an envelope as NDN content / application parameter bytes.
pub fn encode(envelope: &Envelope) -> Bytes {
    let record = WireRecord {
        value: envelope.numeric,
        payload: envelope.text.clone(),
        raw: envelope.raw.as_ref().map(|r| BASE64.encode(r)),
    };
    // Serializing a struct of integers and strings cannot fail.
    let encoded = serde_json::to_vec(&record).unwrap_or_default();
    Bytes::from(encoded)
}

/// Strict structured decode (first tier).
pub fn decode_structured(bytes: &[u8]) -> Result<Envelope, CodecError> {
    let record: WireRecord = serde_json::from_slice(bytes)?;
    let raw = match record.raw {
        Some(r) => Some(Bytes::from(BASE64.decode(r)?)),
        None => None,
    };
    Ok(Envelope {
        numeric: record.value,
        text: record.payload,
        raw,
    })
}

/// Decode bytes into an envelope. Never fails.
pub fn decode(bytes: &[u8]) -> Envelope {
    if let Ok(envelope) = decode_structured(bytes) {
        return envelope;
    }

    if let Some(n) = std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
    {
        return Envelope::new(n, "");
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => Envelope::new(0, text),
        Err(_) => Envelope::new(0, String::from_utf8_lossy(bytes))
            .with_raw(Bytes::copy_from_slice(bytes)),
    }
}

/// Name used to carry a request over NDN: `<prefix>/<numeric>/<text>`.
pub fn request_name(prefix: &Name, envelope: &Envelope) -> Name {
    prefix
        .append(envelope.numeric.to_string())
        .append(envelope.text.as_str())
}

/// Recover a request envelope from the components following `prefix`.
///
/// `/<prefix>/<numeric>/<text>` yields both fields; any other shape falls
/// back to decoding the last component.
pub fn envelope_from_name(prefix: &Name, name: &Name) -> Option<Envelope> {
    if !prefix.is_prefix_of(name) {
        return None;
    }

    match name.suffix_after(prefix.len()) {
        [] => None,
        [numeric, text] => {
            let parsed = numeric
                .as_str()
                .and_then(|n| n.parse::<i64>().ok());
            match parsed {
                Some(n) => Some(Envelope::new(n, component_text(text))),
                None => Some(decode(text.as_bytes())),
            }
        }
        [.., last] => Some(decode(last.as_bytes())),
    }
}

fn component_text(component: &Component) -> String {
    String::from_utf8_lossy(component.as_bytes()).into_owned()
}
