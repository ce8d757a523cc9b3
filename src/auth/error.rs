//! Authentication error definitions.

use std::sync::Arc;

use thiserror::Error;

use crate::transport::TransportError;

/// Why a grant request did not yield tokens.
#[derive(Debug, Error)]
pub enum GrantFailure {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("malformed grant response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors that can occur while obtaining tokens.
///
/// Cloneable so one renewal outcome can be handed to every caller waiting on it.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The credential grant was rejected or unreachable. Terminal.
    #[error("authentication failed: {0}")]
    Authentication(#[source] Arc<GrantFailure>),

    /// The refresh grant was rejected or unreachable.
    #[error("token refresh failed: {0}")]
    TokenRefresh(#[source] Arc<GrantFailure>),

    /// A refresh was requested with no refresh token on hand.
    #[error("no refresh token available")]
    MissingRefreshToken,
}

impl AuthError {
    /// The underlying transport failure, if any.
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            AuthError::Authentication(failure) | AuthError::TokenRefresh(failure) => {
                match failure.as_ref() {
                    GrantFailure::Transport(e) => Some(e),
                    GrantFailure::Decode(_) => None,
                }
            }
            AuthError::MissingRefreshToken => None,
        }
    }
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
