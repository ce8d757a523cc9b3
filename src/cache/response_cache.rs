//! TTL response cache with optional LRU bound.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;

use crate::clock::Clock;
use crate::observability::metrics;

/// A cached response payload.
#[derive(Debug)]
struct CacheEntry {
    value: Value,
    /// Absolute expiry in epoch milliseconds.
    expires_at: i64,
    /// Logical timestamp of the last read or write.
    last_used: AtomicU64,
    /// Logical timestamp of the write that created this entry.
    written: u64,
}

impl CacheEntry {
    fn is_live(&self, now_millis: i64) -> bool {
        now_millis < self.expires_at
    }
}

/// Read-through cache keyed by request identity.
///
/// Entries expire lazily: an expired entry is removed by the next `get` for
/// its key (or by a write that needs room). There is no background sweeper.
///
/// Every invalidation bumps a generation counter. A read that started before
/// an invalidation stores its response with [`ResponseCache::set_if_generation`]
/// so it cannot repopulate what the invalidation dropped.
#[derive(Debug)]
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    max_entries: Option<usize>,
    clock: Arc<dyn Clock>,
    tick: AtomicU64,
    generation: AtomicU64,
}

impl ResponseCache {
    /// Create a cache. `max_entries` of `None` leaves it unbounded.
    pub fn new(max_entries: Option<usize>, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
            clock,
            tick: AtomicU64::new(0),
            generation: AtomicU64::new(0),
        }
    }

    fn next_tick(&self) -> u64 {
        self.tick.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Return the value for `key` if it has not expired.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now_millis();

        // The shard guard must be released before removing from the same map.
        let expired = match self.entries.get(key) {
            None => {
                metrics::record_cache_lookup("miss");
                return None;
            }
            Some(entry) if entry.is_live(now) => {
                entry.last_used.store(self.next_tick(), Ordering::Relaxed);
                metrics::record_cache_lookup("hit");
                tracing::trace!(key, "Cache hit");
                return Some(entry.value.clone());
            }
            Some(_) => true,
        };

        if expired {
            self.entries.remove_if(key, |_, entry| !entry.is_live(now));
            metrics::record_cache_lookup("expired");
            tracing::debug!(key, "Evicted expired cache entry");
        }
        None
    }

    /// Store `value` under `key` for `ttl`, replacing any existing entry.
    pub fn set(&self, key: impl Into<String>, value: Value, ttl: Duration) {
        self.insert(key.into(), value, ttl);
    }

    /// Current invalidation generation. Capture it before fetching a value
    /// that will be stored with [`ResponseCache::set_if_generation`].
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Like [`ResponseCache::set`], but only while no invalidation has run
    /// since `generation` was captured. Returns whether the value was kept.
    pub fn set_if_generation(
        &self,
        key: impl Into<String>,
        value: Value,
        ttl: Duration,
        generation: u64,
    ) -> bool {
        let key = key.into();
        if self.generation() != generation {
            tracing::debug!(key = %key, "Skipping cache write after invalidation");
            return false;
        }

        let written = self.insert(key.clone(), value, ttl);

        // An invalidation may have run between the check and the insert.
        if self.generation() != generation {
            self.entries.remove_if(&key, |_, entry| entry.written == written);
            metrics::record_cache_size(self.entries.len());
            tracing::debug!(key = %key, "Dropped cache write raced by invalidation");
            return false;
        }
        true
    }

    fn insert(&self, key: String, value: Value, ttl: Duration) -> u64 {
        let expires_at = self
            .clock
            .now_millis()
            .saturating_add(i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX));
        let written = self.next_tick();

        self.entries.insert(
            key,
            CacheEntry {
                value,
                expires_at,
                last_used: AtomicU64::new(written),
                written,
            },
        );

        if let Some(max) = self.max_entries {
            if self.entries.len() > max {
                self.make_room(max);
            }
        }
        metrics::record_cache_size(self.entries.len());
        written
    }

    fn make_room(&self, max: usize) {
        let now = self.clock.now_millis();
        self.entries.retain(|_, entry| entry.is_live(now));

        while self.entries.len() > max {
            let lru = self
                .entries
                .iter()
                .min_by_key(|r| r.value().last_used.load(Ordering::Relaxed))
                .map(|r| r.key().clone());
            match lru {
                Some(key) => {
                    self.entries.remove(&key);
                    tracing::debug!(key = %key, "Evicted least recently used cache entry");
                }
                None => break,
            }
        }
    }

    // Bumped before removal so a racing `set_if_generation` sees it.
    fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Drop a single entry.
    pub fn invalidate(&self, key: &str) -> bool {
        self.bump_generation();
        self.entries.remove(key).is_some()
    }

    /// Drop every entry whose key matches `predicate`. Returns how many were removed.
    pub fn invalidate_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        self.bump_generation();
        let before = self.entries.len();
        self.entries.retain(|key, _| !predicate(key));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            metrics::record_cache_size(self.entries.len());
        }
        removed
    }

    pub fn clear(&self) {
        self.bump_generation();
        self.entries.clear();
        metrics::record_cache_size(0);
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}
