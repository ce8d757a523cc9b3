//! Response caching subsystem.
//!
//! # Data Flow
//! ```text
//! read operation
//!     → keys.rs (request identity → key)
//!     → ResponseCache::get(key)   hit  → return cached payload
//!                                 miss → network call
//!     → on success: ResponseCache::set(key, payload, ttl)
//!
//! write operation (when invalidation is enabled)
//!     → ResponseCache::invalidate / invalidate_where
//! ```
//!
//! # Design Decisions
//! - Lazy expiry: no sweeper task, expired entries vanish on next access
//! - Optional capacity bound evicts least recently used entries
//! - Misses are never errors

pub mod keys;
pub mod response_cache;

pub use keys::Page;
pub use response_cache::ResponseCache;
