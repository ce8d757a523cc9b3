//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the SDK.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the SDK.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct SdkConfig {
    /// Remote API location and per-attempt timeout.
    pub api: ApiConfig,

    /// Retry configuration.
    pub retries: RetryConfig,

    /// Response cache settings.
    pub cache: CacheConfig,

    /// Token lifecycle behaviour.
    pub auth: AuthConfig,

    /// Token persistence.
    pub storage: StorageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Remote API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the API (e.g., "https://api.example.com").
    pub base_url: String,

    /// Path of the credential grant endpoint.
    pub token_path: String,

    /// Path of the refresh grant endpoint.
    pub refresh_path: String,

    /// Timeout for a single HTTP attempt in milliseconds.
    pub timeout_ms: u64,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            token_path: "/auth/token".to_string(),
            refresh_path: "/auth/refresh-token".to_string(),
            timeout_ms: 10_000,
            user_agent: concat!("advanced-sdk/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiConfig {
    /// Base URL without a trailing slash.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn token_url(&self) -> String {
        format!("{}{}", self.base(), self.token_path)
    }

    pub fn refresh_url(&self) -> String {
        format!("{}{}", self.base(), self.refresh_path)
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the initial attempt (total attempts = 1 + max_retries).
    pub max_retries: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Add up to 10% random jitter to each delay.
    pub jitter: bool,

    /// Retry when no response was received (connect failure, timeout).
    pub retry_network_errors: bool,

    /// Retry on 5xx responses.
    pub retry_server_errors: bool,

    /// Additional statuses treated as transient (e.g., 429). Never 401/403.
    pub extra_retryable_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 5_000,
            jitter: true,
            retry_network_errors: true,
            retry_server_errors: true,
            extra_retryable_statuses: Vec::new(),
        }
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Time-to-live for cached read responses in milliseconds.
    pub ttl_ms: u64,

    /// Upper bound on live entries; least recently used entries are evicted.
    /// `None` leaves the cache unbounded.
    pub max_entries: Option<usize>,

    /// Drop affected read entries after a successful create/update/delete.
    pub invalidate_on_write: bool,

    /// Sort and dedupe ids before deriving batch cache keys.
    pub canonical_batch_keys: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: 60_000,
            max_entries: Some(1024),
            invalidate_on_write: true,
            canonical_batch_keys: false,
        }
    }
}

/// Token lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    /// On a 401 from a resource call, renew the token once and replay the call.
    pub reauthenticate_on_unauthorized: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            reauthenticate_on_unauthorized: true,
        }
    }
}

/// Token persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding persisted tokens. In-memory storage when absent.
    pub token_file: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON formatted log lines.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
