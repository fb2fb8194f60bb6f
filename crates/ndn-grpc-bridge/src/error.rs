// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bridge error taxonomy and its mapping onto gRPC status codes.

use crate::config::ConfigError;
use crate::name::{Name, NameError};
use crate::ndn::NackReason;
use thiserror::Error;

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Bridge errors.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Payload could not be decoded: {0}")]
    DecodeFailure(String),

    #[error("No route for {0}")]
    RouteNotFound(Name),

    #[error("{0} adapter not connected yet")]
    AdapterNotReady(&'static str),

    #[error("Request refused: {0}")]
    AdapterNack(NackReason),

    #[error("Timeout waiting for {0} response")]
    AdapterTimeout(&'static str),

    #[error("Adapter fault: {0}")]
    AdapterFault(String),

    /// Detail is surfaced verbatim to callers.
    #[error("{0}")]
    ConfigurationMissing(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid name: {0}")]
    Name(#[from] NameError),

    #[error("gRPC transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// True for errors resolved locally into a synthesized response.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::RouteNotFound(_) | Self::ConfigurationMissing(_) | Self::AdapterNotReady(_)
        )
    }

    /// gRPC status code for this error.
    pub fn status_code(&self) -> tonic::Code {
        match self {
            Self::AdapterNack(_) | Self::RouteNotFound(_) => tonic::Code::NotFound,
            Self::AdapterTimeout(_) => tonic::Code::DeadlineExceeded,
            _ => tonic::Code::Internal,
        }
    }
}

impl From<&BridgeError> for tonic::Status {
    fn from(err: &BridgeError) -> Self {
        tonic::Status::new(err.status_code(), err.to_string())
    }
}

impl From<BridgeError> for tonic::Status {
    fn from(err: BridgeError) -> Self {
        tonic::Status::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let nack = BridgeError::AdapterNack(NackReason::NoRoute);
        assert_eq!(tonic::Status::from(&nack).code(), tonic::Code::NotFound);

        let missing = BridgeError::RouteNotFound("/a".parse().unwrap());
        assert_eq!(tonic::Status::from(&missing).code(), tonic::Code::NotFound);

        let timeout = BridgeError::AdapterTimeout("NDN");
        assert_eq!(
            tonic::Status::from(&timeout).code(),
            tonic::Code::DeadlineExceeded
        );

        let fault = BridgeError::AdapterFault("boom".into());
        assert_eq!(tonic::Status::from(&fault).code(), tonic::Code::Internal);
    }

    #[test]
    fn test_configuration_missing_detail() {
        let err = BridgeError::ConfigurationMissing("No interests configured".into());
        let status = tonic::Status::from(err);
        assert_eq!(status.code(), tonic::Code::Internal);
        assert_eq!(status.message(), "No interests configured");
    }

    #[test]
    fn test_local_errors() {
        assert!(BridgeError::AdapterNotReady("NDN").is_local());
        assert!(BridgeError::ConfigurationMissing("x".into()).is_local());
        assert!(!BridgeError::AdapterTimeout("NDN").is_local());
    }
}
