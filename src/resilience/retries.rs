//! Retry policy.
//!
//! # Responsibilities
//! - Decide whether a failed attempt is worth repeating
//! - Bound the number of attempts
//! - Compute the wait between attempts
//!
//! # Design Decisions
//! - Connection errors and 5xx are transient; other statuses only when listed
//! - 401/403 always propagate immediately so the auth layer can react
//! - Jitter is 0-10% on top of the capped delay

use std::time::Duration;

use reqwest::StatusCode;

use crate::config::RetryConfig;
use crate::resilience::backoff::calculate_backoff;

/// Explicit, configurable retry predicate and schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: bool,
    pub retry_network_errors: bool,
    pub retry_server_errors: bool,
    pub extra_retryable_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
            jitter: config.jitter,
            retry_network_errors: config.retry_network_errors,
            retry_server_errors: config.retry_server_errors,
            extra_retryable_statuses: config.extra_retryable_statuses.clone(),
        }
    }
}

impl RetryPolicy {
    /// Policy that makes exactly one attempt.
    pub fn no_retries() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Total attempts including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Whether a response with this status should be retried.
    pub fn is_retryable_status(&self, status: StatusCode) -> bool {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return false;
        }
        if status.is_server_error() {
            return self.retry_server_errors;
        }
        self.extra_retryable_statuses.contains(&status.as_u16())
    }

    /// Whether a failure with no response should be retried.
    pub fn is_retryable_network_error(&self, err: &reqwest::Error) -> bool {
        if !self.retry_network_errors {
            return false;
        }
        // Builder and redirect errors are not transient.
        err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
    }

    /// Delay to wait after the attempt with the given zero-based index.
    pub fn delay_after(&self, attempt_index: u32) -> Duration {
        calculate_backoff(attempt_index, self.base_delay_ms, self.max_delay_ms, self.jitter)
    }
}
