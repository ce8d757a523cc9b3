//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, delays ordered)
//! - Keep authentication failures out of the retry predicate
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SdkConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use url::Url;

use crate::config::schema::SdkConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &SdkConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.api.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "api.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "api.base_url",
            format!("invalid URL '{}': {}", config.api.base_url, e),
        )),
    }

    for (field, path) in [
        ("api.token_path", &config.api.token_path),
        ("api.refresh_path", &config.api.refresh_path),
    ] {
        if !path.starts_with('/') {
            errors.push(ValidationError::new(field, "must start with '/'"));
        }
    }

    if config.api.timeout_ms == 0 {
        errors.push(ValidationError::new("api.timeout_ms", "must be greater than 0"));
    }

    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            format!(
                "base delay {}ms exceeds max delay {}ms",
                config.retries.base_delay_ms, config.retries.max_delay_ms
            ),
        ));
    }

    for status in &config.retries.extra_retryable_statuses {
        if !(100..=599).contains(status) {
            errors.push(ValidationError::new(
                "retries.extra_retryable_statuses",
                format!("{} is not an HTTP status", status),
            ));
        } else if *status == 401 || *status == 403 {
            errors.push(ValidationError::new(
                "retries.extra_retryable_statuses",
                format!("{} must propagate to the auth layer and cannot be retried", status),
            ));
        }
    }

    if config.cache.ttl_ms == 0 {
        errors.push(ValidationError::new("cache.ttl_ms", "must be greater than 0"));
    }

    if config.cache.max_entries == Some(0) {
        errors.push(ValidationError::new(
            "cache.max_entries",
            "must be greater than 0 when set",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&SdkConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = SdkConfig::default();
        config.api.base_url = "ftp://example.com".into();
        config.api.timeout_ms = 0;
        config.retries.base_delay_ms = 10_000;
        config.cache.max_entries = Some(0);

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "api.base_url",
                "api.timeout_ms",
                "retries.base_delay_ms",
                "cache.max_entries"
            ]
        );
    }

    #[test]
    fn test_rejects_retrying_auth_failures() {
        let mut config = SdkConfig::default();
        config.retries.extra_retryable_statuses = vec![429, 401];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("401"));
    }

    #[test]
    fn test_rejects_relative_paths() {
        let mut config = SdkConfig::default();
        config.api.refresh_path = "auth/refresh-token".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "api.refresh_path");
    }
}
