//! SDK facade.
//!
//! Wires a single [`SdkConfig`] into the authenticated request pipeline:
//!
//! ```text
//! SdkConfig
//!     → RetryingTransport (api timeout, retry policy)
//!     → Authenticator (token/refresh URLs, token store, clock)
//!     → AuthenticatedRequestExecutor
//!     → ResponseCache + UserResource
//! ```

use std::path::Path;
use std::sync::Arc;

use crate::auth::{Authenticator, Credential};
use crate::cache::ResponseCache;
use crate::client::AuthenticatedRequestExecutor;
use crate::clock::{Clock, SystemClock};
use crate::config::validation::validate_config;
use crate::config::{load_config, ConfigError, SdkConfig};
use crate::error::SdkResult;
use crate::resilience::RetryPolicy;
use crate::resources::UserResource;
use crate::storage::{FileTokenStore, MemoryTokenStore, TokenStore};
use crate::transport::RetryingTransport;

/// Entry point bundling authentication and resource access.
#[derive(Debug)]
pub struct AdvancedSdk {
    config: SdkConfig,
    auth: Arc<Authenticator>,
    executor: Arc<AuthenticatedRequestExecutor>,
    users: UserResource,
}

impl AdvancedSdk {
    /// Build an SDK from config. Tokens persist to `storage.token_file` when
    /// set, otherwise they live only in memory.
    pub fn new(config: SdkConfig, credential: Credential) -> SdkResult<Self> {
        let store: Arc<dyn TokenStore> = match &config.storage.token_file {
            Some(path) => Arc::new(FileTokenStore::new(path)),
            None => Arc::new(MemoryTokenStore::new()),
        };
        Self::with_components(config, credential, store, Arc::new(SystemClock))
    }

    /// Default settings against `base_url`.
    pub fn for_base_url(
        base_url: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> SdkResult<Self> {
        let mut config = SdkConfig::default();
        config.api.base_url = base_url.into();
        Self::new(config, Credential::new(email, password))
    }

    /// Load TOML config from `path` and build the SDK from it.
    pub fn from_config_file(path: impl AsRef<Path>, credential: Credential) -> SdkResult<Self> {
        let config = load_config(path.as_ref())?;
        Self::new(config, credential)
    }

    /// Build with an explicit token store and clock.
    pub fn with_components(
        config: SdkConfig,
        credential: Credential,
        store: Arc<dyn TokenStore>,
        clock: Arc<dyn Clock>,
    ) -> SdkResult<Self> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let transport = Arc::new(RetryingTransport::from_config(
            &config.api,
            RetryPolicy::from(&config.retries),
        )?);

        let auth = Arc::new(Authenticator::new(
            credential,
            config.api.token_url(),
            config.api.refresh_url(),
            transport.clone(),
            store,
            clock.clone(),
        )?);

        let executor = Arc::new(
            AuthenticatedRequestExecutor::new(auth.clone(), transport)
                .with_reauthentication(config.auth.reauthenticate_on_unauthorized),
        );

        let cache = Arc::new(ResponseCache::new(config.cache.max_entries, clock));
        let users = UserResource::new(executor.clone(), cache, config.api.base(), &config.cache);

        tracing::debug!(
            base_url = config.api.base(),
            max_retries = config.retries.max_retries,
            cache_ttl_ms = config.cache.ttl_ms,
            "SDK initialised"
        );

        Ok(Self {
            config,
            auth,
            executor,
            users,
        })
    }

    pub fn auth(&self) -> &Arc<Authenticator> {
        &self.auth
    }

    pub fn users(&self) -> &UserResource {
        &self.users
    }

    /// The request pipeline, for endpoints the SDK has no resource type for.
    pub fn executor(&self) -> &Arc<AuthenticatedRequestExecutor> {
        &self.executor
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        self.users.cache()
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthState;
    use crate::error::SdkError;

    #[test]
    fn test_derives_auth_urls_from_base() {
        let sdk = AdvancedSdk::for_base_url("http://api.test/", "a@x.com", "p").unwrap();
        let debug = format!("{:?}", sdk.auth());
        assert!(debug.contains("http://api.test/auth/token"));
        assert!(debug.contains("http://api.test/auth/refresh-token"));
        assert_eq!(sdk.auth().state(), AuthState::Unauthenticated);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = SdkConfig::default();
        config.cache.ttl_ms = 0;

        let err = AdvancedSdk::new(config, Credential::new("a@x.com", "p")).unwrap_err();
        assert!(matches!(err, SdkError::Config(ConfigError::Validation(_))));
    }
}
