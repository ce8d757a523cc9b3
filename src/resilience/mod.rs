//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! RetryingTransport attempt fails:
//!     → retries.rs (is the failure class retryable? attempts left?)
//!     → backoff.rs (base * 2^attempt, capped, optionally jittered)
//!     → sleep, then next attempt
//! ```
//!
//! # Design Decisions
//! - The per-attempt timeout lives on the HTTP client and feeds the retry budget
//! - Retry decisions are pure functions of the policy and the failure

pub mod backoff;
pub mod retries;

pub use retries::RetryPolicy;
