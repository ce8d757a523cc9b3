//! Cache key derivation for user reads.
//!
//! Keys are derived from the request identity alone:
//! - single user: `users_{id}`
//! - list: `users_page_{page}_limit_{limit}`, or `users_all` without pagination
//! - batch: `users_batch_{id,id,...}` in request order unless canonicalised

use std::collections::BTreeSet;
use std::fmt::Display;

const USER_PREFIX: &str = "users_";
const PAGE_PREFIX: &str = "users_page_";
const BATCH_PREFIX: &str = "users_batch_";
const ALL_USERS: &str = "users_all";

/// Pagination parameters for list reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Query string appended to the list URL.
    pub fn query(&self) -> String {
        format!("?page={}&limit={}", self.page, self.limit)
    }
}

pub fn user_key(id: impl Display) -> String {
    format!("{}{}", USER_PREFIX, id)
}

pub fn list_key(page: Option<Page>) -> String {
    match page {
        Some(p) => format!("{}{}_limit_{}", PAGE_PREFIX, p.page, p.limit),
        None => ALL_USERS.to_string(),
    }
}

/// Key for a batch read.
///
/// Without `canonical` the key keeps the caller's ordering and duplicates, so
/// the same set requested in a different order is a separate entry.
pub fn batch_key<T: Display>(ids: &[T], canonical: bool) -> String {
    let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
    let joined = if canonical {
        ids.into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>()
            .join(",")
    } else {
        ids.join(",")
    };
    format!("{}{}", BATCH_PREFIX, joined)
}

/// Whether `key` caches any user read.
pub fn is_user_scoped(key: &str) -> bool {
    key.starts_with(USER_PREFIX)
}

/// Whether `key` caches a list read.
pub fn is_list_key(key: &str) -> bool {
    key == ALL_USERS || key.starts_with(PAGE_PREFIX)
}

/// Whether `key` caches a batch read.
pub fn is_batch_key(key: &str) -> bool {
    key.starts_with(BATCH_PREFIX)
}

/// Whether `key` caches data that includes user `id`, either directly or as
/// part of a batch.
pub fn key_references_user(key: &str, id: &str) -> bool {
    if let Some(ids) = key.strip_prefix(BATCH_PREFIX) {
        return ids.split(',').any(|candidate| candidate == id);
    }
    !is_list_key(key) && key.strip_prefix(USER_PREFIX) == Some(id)
}
