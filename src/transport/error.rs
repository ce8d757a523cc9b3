//! Transport failure classes.

use reqwest::StatusCode;
use thiserror::Error;

/// Why a transport call did not produce a successful response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No response was received (connect failure, timeout, broken body).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The server answered with a 5xx status.
    #[error("server error {status}: {body}")]
    Server { status: StatusCode, body: String },

    /// The server answered with a 4xx status (or another non-success status).
    #[error("client error {status}: {body}")]
    Client { status: StatusCode, body: String },

    /// The request could not be constructed.
    #[error("invalid request: {0}")]
    Build(String),
}

impl TransportError {
    /// Classify a non-success status.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        if status.is_server_error() {
            TransportError::Server { status, body }
        } else {
            TransportError::Client { status, body }
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            TransportError::Server { status, .. } | TransportError::Client { status, .. } => {
                Some(*status)
            }
            TransportError::Network(e) => e.status(),
            TransportError::Build(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Response body, if the server sent one.
    pub fn body(&self) -> Option<&str> {
        match self {
            TransportError::Server { body, .. } | TransportError::Client { body, .. } => {
                Some(body)
            }
            _ => None,
        }
    }
}
