//! Shared fixtures for integration tests: a wiremock-backed user API and an
//! SDK wired to a manual clock and in-memory token store.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use advanced_sdk::clock::ManualClock;
use advanced_sdk::storage::{MemoryTokenStore, TokenField, TokenStore};
use advanced_sdk::{AdvancedSdk, Credential, SdkConfig};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const EMAIL: &str = "user@example.com";
pub const PASSWORD: &str = "secret";

/// Start of every manual clock, in epoch milliseconds.
pub const T0: i64 = 1_700_000_000_000;

/// Access token lifetime handed out by the mock grants.
pub const TOKEN_TTL_MS: i64 = 60_000;

pub struct TestSdk {
    pub sdk: AdvancedSdk,
    pub server: MockServer,
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryTokenStore>,
}

impl TestSdk {
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    /// Move the clock past the current access token's expiry.
    pub fn expire_token(&self) {
        if let Some(expiry) = self.sdk.auth().tokens().access_token_expiry {
            self.clock.set(expiry);
        }
    }
}

/// Config pointing at `base_url` with millisecond backoff.
pub fn fast_config(base_url: &str) -> SdkConfig {
    let mut config = SdkConfig::default();
    config.api.base_url = base_url.to_string();
    config.api.timeout_ms = 2_000;
    config.retries.base_delay_ms = 1;
    config.retries.max_delay_ms = 5;
    config.retries.jitter = false;
    config
}

pub async fn setup() -> TestSdk {
    setup_with(|_| {}).await
}

/// Start a mock server and build an SDK against it, letting the caller tweak
/// the config first.
pub async fn setup_with<F>(tweak: F) -> TestSdk
where
    F: FnOnce(&mut SdkConfig),
{
    let server = MockServer::start().await;
    let mut config = fast_config(&server.uri());
    tweak(&mut config);
    build(server, config, Arc::new(MemoryTokenStore::new()))
}

/// Like [`setup`], with a usable access token already persisted so no grant
/// is needed before the first call.
pub async fn setup_authenticated(access_token: &str) -> TestSdk {
    setup_authenticated_with(access_token, |_| {}).await
}

pub async fn setup_authenticated_with<F>(access_token: &str, tweak: F) -> TestSdk
where
    F: FnOnce(&mut SdkConfig),
{
    let server = MockServer::start().await;
    let mut config = fast_config(&server.uri());
    tweak(&mut config);

    let store = Arc::new(MemoryTokenStore::new());
    store.save(TokenField::AccessToken, access_token).unwrap();
    store
        .save(TokenField::AccessTokenExpiry, &(T0 + TOKEN_TTL_MS).to_string())
        .unwrap();

    build(server, config, store)
}

fn build(server: MockServer, config: SdkConfig, store: Arc<MemoryTokenStore>) -> TestSdk {
    let clock = Arc::new(ManualClock::new(T0));
    let sdk = AdvancedSdk::with_components(
        config,
        Credential::new(EMAIL, PASSWORD),
        store.clone(),
        clock.clone(),
    )
    .expect("sdk");

    TestSdk {
        sdk,
        server,
        clock,
        store,
    }
}

/// Mount `POST /auth/token` answering with the given tokens.
pub async fn mount_token_grant(
    server: &MockServer,
    access_token: &str,
    refresh_token: &str,
    expires_at: i64,
    expected_calls: u64,
) {
    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .and(body_json(json!({ "email": EMAIL, "password": PASSWORD })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": access_token,
            "refreshToken": refresh_token,
            "expiresIn": expires_at,
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Mount `POST /auth/refresh-token` accepting `refresh_token`.
pub async fn mount_refresh_grant(
    server: &MockServer,
    refresh_token: &str,
    access_token: &str,
    expires_at: i64,
    expected_calls: u64,
) {
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .and(body_json(json!({ "refreshToken": refresh_token })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": access_token,
            "expiresIn": expires_at,
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

pub fn user(id: &str) -> serde_json::Value {
    json!({ "id": id, "name": format!("User {}", id), "email": format!("{}@example.com", id) })
}
