//! Token persistence subsystem.
//!
//! # Data Flow
//! ```text
//! Authenticator::new
//!     → TokenStore::load (missing keys → absent fields)
//!     → TokenState held in memory
//!
//! Successful authenticate / refresh
//!     → TokenStore::save per field, immediately (no batching)
//! ```
//!
//! # Design Decisions
//! - Storage is injected; the SDK never reaches for ambient global state
//! - Values are opaque text; the expiry is an integer stored as text
//! - Cross-process consistency is not guaranteed

pub mod token_store;

pub use token_store::{FileTokenStore, MemoryTokenStore, StoreError, TokenField, TokenStore};
