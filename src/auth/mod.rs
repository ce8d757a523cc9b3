//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! ensure_valid()
//!     → token usable? return it
//!     → renewal gate (one renewal in flight)
//!     → refresh grant (POST refreshUrl {refreshToken})
//!     → on any failure: credential grant (POST tokenUrl {email, password})
//!     → TokenState swapped in memory, each field persisted immediately
//! ```
//!
//! # Design Decisions
//! - Tokens are opaque; only the expiry timestamp is interpreted
//! - Failures never clear stored tokens
//! - Grants go through the same retrying transport as resource calls

pub mod authenticator;
pub mod error;
pub mod types;

pub use authenticator::Authenticator;
pub use error::{AuthError, AuthResult, GrantFailure};
pub use types::{AuthState, Credential, RefreshGrant, TokenGrant, TokenState};
