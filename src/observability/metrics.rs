//! Metrics collection.
//!
//! # Metrics
//! - `sdk_http_attempts_total` (counter): attempts by outcome
//! - `sdk_retries_total` (counter): retries scheduled
//! - `sdk_auth_grants_total` (counter): grants by kind and outcome
//! - `sdk_cache_lookups_total` (counter): lookups by result
//! - `sdk_cache_entries` (gauge): live entries after each write

/// Record one HTTP attempt. `outcome` is "success", "network", or the status class.
pub fn record_attempt(outcome: &'static str) {
    metrics::counter!("sdk_http_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_retry() {
    metrics::counter!("sdk_retries_total").increment(1);
}

/// Record a credential or refresh grant.
pub fn record_grant(grant: &'static str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!("sdk_auth_grants_total", "grant" => grant, "outcome" => outcome)
        .increment(1);
}

/// Record a cache lookup. `result` is "hit", "miss", or "expired".
pub fn record_cache_lookup(result: &'static str) {
    metrics::counter!("sdk_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_cache_size(entries: usize) {
    metrics::gauge!("sdk_cache_entries").set(entries as f64);
}
