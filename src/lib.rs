//! Advanced SDK Core
//!
//! Client-side SDK that calls a remote user API without the caller managing
//! credentials, token expiry, or repeated round-trips.
//!
//! # Architecture Overview
//!
//! ```text
//!   UserResource op
//!        │
//!        ▼
//!   ┌──────────────┐ hit
//!   │ResponseCache │──────────────▶ cached payload
//!   └──────┬───────┘
//!          │ miss / write
//!          ▼
//!   ┌──────────────────────────┐     ┌───────────────┐     ┌────────────┐
//!   │AuthenticatedRequest-     │────▶│ Authenticator │────▶│ TokenStore │
//!   │Executor                  │     │ ensure_valid  │     └────────────┘
//!   └──────┬───────────────────┘     └──────┬────────┘
//!          │ bearer token                   │ grants
//!          ▼                                ▼
//!   ┌───────────────────────────────────────────┐
//!   │ RetryingTransport (backoff, retry policy) │───▶ remote API
//!   └───────────────────────────────────────────┘
//!
//!   Cross-cutting: config, observability (tracing + metrics), clock
//! ```

// Core pipeline
pub mod auth;
pub mod client;
pub mod transport;

// State
pub mod cache;
pub mod clock;
pub mod storage;

// Resources
pub mod resources;
pub mod sdk;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod observability;
pub mod resilience;

pub use auth::{AuthError, AuthState, Authenticator, Credential, TokenState};
pub use cache::{Page, ResponseCache};
pub use client::AuthenticatedRequestExecutor;
pub use config::SdkConfig;
pub use error::{SdkError, SdkResult};
pub use resources::UserResource;
pub use sdk::AdvancedSdk;
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use transport::RetryingTransport;
