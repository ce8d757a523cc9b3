//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! transport / auth / cache / resources produce:
//!     → tracing events and spans (request id, attempt, status)
//!     → metrics.rs (counters, gauges via the `metrics` facade)
//!
//! Consumers:
//!     → logging.rs installs a subscriber (stdout, plain or JSON)
//!     → any `metrics` recorder the host application installs
//! ```
//!
//! # Design Decisions
//! - The library never installs global state on its own; binaries call init
//! - Token and password values are never logged
//! - Metrics are cheap no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
