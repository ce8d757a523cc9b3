//! Resource operations exposed by the SDK.
//!
//! # Data Flow
//! ```text
//! read  (get_user_by_id, get_users, get_users_batch)
//!     → cache key → ResponseCache hit? return it
//!     → AuthenticatedRequestExecutor::execute_json
//!     → ResponseCache::set_if_generation on success only
//!
//! write (create / update / delete, single and batch)
//!     → AuthenticatedRequestExecutor::execute_json
//!     → on success: drop list keys and keys naming the affected ids
//! ```
//!
//! # Design Decisions
//! - Payloads are opaque JSON; no user schema is imposed
//! - Failed calls never populate or invalidate the cache
//! - A read overlapping any invalidation returns its response uncached

pub mod users;

pub use users::UserResource;
