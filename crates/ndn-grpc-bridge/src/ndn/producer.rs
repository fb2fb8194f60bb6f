// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! NDN producer adapter.
//!
//! Every Interest delivered for a registered prefix is answered with exactly
//! one Data packet. When the handler fails (or panics) the Data carries a
//! textual error description instead.

use super::face::{FaceError, NdnFace};
use super::packet::{Data, Interest};
use crate::error::BridgeResult;
use crate::name::Name;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Produces content for Interests under a registered prefix.
#[async_trait]
pub trait InterestHandler: Send + Sync + 'static {
    async fn handle(&self, interest: &Interest) -> BridgeResult<Bytes>;
}

/// Serves registered prefixes on a face.
pub struct NdnProducer {
    face: Arc<dyn NdnFace>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl NdnProducer {
    pub fn new(face: Arc<dyn NdnFace>) -> Self {
        Self {
            face,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Register `prefix` and answer its Interests with `handler`.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn register_route(
        &self,
        prefix: Name,
        freshness: Duration,
        handler: Arc<dyn InterestHandler>,
    ) -> Result<(), FaceError> {
        let rx = self.face.register_route(prefix.clone()).await?;
        info!("Serving prefix: {} (freshness {:?})", prefix, freshness);

        let task = tokio::spawn(serve_prefix(self.face.clone(), prefix, freshness, handler, rx));
        self.tasks.lock().push(task);
        Ok(())
    }

    /// Number of prefixes being served.
    pub fn served_prefixes(&self) -> usize {
        self.tasks.lock().iter().filter(|t| !t.is_finished()).count()
    }

    /// Stop serving every prefix.
    pub fn shutdown(&self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }
}

impl Drop for NdnProducer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn serve_prefix(
    face: Arc<dyn NdnFace>,
    prefix: Name,
    freshness: Duration,
    handler: Arc<dyn InterestHandler>,
    mut rx: mpsc::Receiver<Interest>,
) {
    while let Some(interest) = rx.recv().await {
        tokio::spawn(respond(face.clone(), interest, freshness, handler.clone()));
    }
    debug!("Prefix {} no longer receives Interests", prefix);
}

async fn respond(
    face: Arc<dyn NdnFace>,
    interest: Interest,
    freshness: Duration,
    handler: Arc<dyn InterestHandler>,
) {
    let name = interest.name.clone();
    let pit_token = interest.pit_token;
    debug!("Received Interest: {}", name);

    // Run the handler in its own task so a panic still yields a response.
    let result = tokio::spawn(async move { handler.handle(&interest).await }).await;
    let content = match result {
        Ok(Ok(content)) => content,
        Ok(Err(e)) => {
            warn!("Handler failed for {}: {}", name, e);
            Bytes::from(format!("Error: {}", e))
        }
        Err(e) => {
            error!("Handler for {} did not complete: {}", name, e);
            Bytes::from(format!("Error: {}", e))
        }
    };

    let mut data = Data::new(name, content).with_freshness(freshness);
    data.pit_token = pit_token;
    debug!("Sending Data: {} ({} bytes)", data.name, data.content.len());
    if let Err(e) = face.put_data(data) {
        warn!("Failed to publish Data: {}", e);
    }
}
