//! # SDK Error Types
//!
//! Unified error handling for the SDK's public operations.

use reqwest::{Method, StatusCode};
use thiserror::Error;

use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::storage::StoreError;
use crate::transport::TransportError;

/// SDK operation result type
pub type SdkResult<T> = Result<T, SdkError>;

/// Terminal failures surfaced to SDK callers.
#[derive(Debug, Error)]
pub enum SdkError {
    /// No usable token could be obtained.
    #[error(transparent)]
    Authentication(#[from] AuthError),

    /// A resource call failed after retries (or without, for 4xx).
    #[error("{method} {url} failed: {source}")]
    Request {
        method: Method,
        url: String,
        #[source]
        source: TransportError,
    },

    /// A successful response body was not the expected JSON.
    #[error("invalid response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("token storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("HTTP client setup failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl SdkError {
    /// Wrap a transport failure with the call it belongs to.
    pub fn request(method: Method, url: impl Into<String>, source: TransportError) -> Self {
        Self::Request {
            method,
            url: url.into(),
            source,
        }
    }

    /// HTTP status of the failed call, when the server answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SdkError::Request { source, .. } => source.status(),
            SdkError::Authentication(e) => e.transport().and_then(TransportError::status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Response body of the failed call, when the server sent one.
    pub fn body(&self) -> Option<&str> {
        match self {
            SdkError::Request { source, .. } => source.body(),
            _ => None,
        }
    }
}
