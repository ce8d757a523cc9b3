//! Authenticated request pipeline.
//!
//! # Data Flow
//! ```text
//! execute(method, url, body)
//!     → Authenticator::ensure_valid (AuthError propagates unchanged)
//!     → RequestDescriptor + Authorization: Bearer {token} + x-request-id
//!     → RetryingTransport::send
//!     → 401 and re-authentication enabled: force_renew, replay once
//!     → TransportError wrapped as SdkError::Request {method, url}
//! ```

pub mod executor;

pub use executor::AuthenticatedRequestExecutor;
