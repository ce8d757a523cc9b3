//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! RequestDescriptor (method, url, body, headers)
//!     → retrying.rs (attempt → classify → retry policy → backoff)
//!     → HttpResponse (2xx, body fully read)
//!       or TransportError (Network | Server | Client | Build)
//! ```
//!
//! # Design Decisions
//! - The body is read inside the attempt so a truncated body is a network failure
//! - Non-success statuses are errors; callers never inspect a 4xx/5xx response
//! - One retry loop shared by auth grants and resource calls

pub mod error;
pub mod request;
pub mod retrying;

pub use error::TransportError;
pub use request::{HttpResponse, RequestDescriptor};
pub use retrying::RetryingTransport;
