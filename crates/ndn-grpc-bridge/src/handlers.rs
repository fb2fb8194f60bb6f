// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Named Interest handlers for custom routes.

use crate::codec::{self, Envelope};
use crate::error::BridgeResult;
use crate::ndn::{Interest, InterestHandler};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;

/// Request carried by an Interest.
///
/// Application parameters take precedence; otherwise the last two name
/// components are read as `<numeric>/<text>`.
pub fn request_envelope(interest: &Interest) -> Envelope {
    if let Some(ref params) = interest.app_params {
        return codec::decode(params);
    }
    let name = &interest.name;
    let base = name.prefix(name.len().saturating_sub(2));
    codec::envelope_from_name(&base, name).unwrap_or_default()
}

/// Increments the numeric field and tags the text as processed.
pub struct ProcessHandler;

#[async_trait]
impl InterestHandler for ProcessHandler {
    async fn handle(&self, interest: &Interest) -> BridgeResult<Bytes> {
        let request = request_envelope(interest);
        let response = Envelope::new(
            request.numeric.wrapping_add(1),
            format!("Processed: {}", request.text),
        );
        tracing::debug!(
            "Processed {} -> {} {:?}",
            interest.name,
            response.numeric,
            response.text
        );
        Ok(codec::encode(&response))
    }
}

/// Returns the request unchanged.
pub struct EchoHandler;

#[async_trait]
impl InterestHandler for EchoHandler {
    async fn handle(&self, interest: &Interest) -> BridgeResult<Bytes> {
        Ok(codec::encode(&request_envelope(interest)))
    }
}

/// Handlers available to custom routes, by name.
#[derive(Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn InterestHandler>>,
}

impl HandlerRegistry {
    /// Registry without any handlers.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn InterestHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn InterestHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Registered handler names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for HandlerRegistry {
    /// Registry with the built-in `process` and `echo` handlers.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("process", Arc::new(ProcessHandler));
        registry.register("echo", Arc::new(EchoHandler));
        registry
    }
}
