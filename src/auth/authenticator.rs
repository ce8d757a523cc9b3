//! Token lifecycle management.
//!
//! # State Machine
//! ```text
//! Unauthenticated ──authenticate──▶ Authenticated
//! Authenticated   ──now ≥ expiry──▶ Expired
//! Expired         ──refresh───────▶ Authenticated
//! Expired         ──refresh fails─▶ authenticate ─▶ Authenticated | AuthError
//! ```
//!
//! The state is never stored; it is computed from `TokenState` and the clock.
//!
//! # Concurrency
//! Renewals run behind a single async gate that also holds the outcome of the
//! last renewal. A caller that queued on the gate while a renewal was in
//! flight takes that renewal's outcome, success or failure, instead of
//! starting another one. Only callers that arrive after it finished renew
//! again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde_json::json;
use tokio::sync::Mutex;

use crate::auth::error::{AuthError, AuthResult, GrantFailure};
use crate::auth::types::{AuthState, Credential, RefreshGrant, TokenGrant, TokenState};
use crate::clock::Clock;
use crate::observability::metrics;
use crate::storage::{StoreError, TokenField, TokenStore};
use crate::transport::{RequestDescriptor, RetryingTransport};

/// Outcome of the most recent renewal, guarded by the renewal gate.
#[derive(Default)]
struct RenewalSlot {
    generation: u64,
    outcome: Option<AuthResult<String>>,
}

/// Owns the token state and keeps a usable access token on hand.
pub struct Authenticator {
    credential: Credential,
    token_url: String,
    refresh_url: String,
    transport: Arc<RetryingTransport>,
    store: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
    tokens: ArcSwap<TokenState>,
    renewal: Mutex<RenewalSlot>,
    /// Completed renewals; mirrors `RenewalSlot::generation` for lock-free reads.
    renewals: AtomicU64,
}

impl Authenticator {
    /// Create an authenticator, loading any persisted tokens from `store`.
    pub fn new(
        credential: Credential,
        token_url: impl Into<String>,
        refresh_url: impl Into<String>,
        transport: Arc<RetryingTransport>,
        store: Arc<dyn TokenStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let tokens = store.load()?;
        tracing::debug!(
            state = ?tokens.state(clock.now_millis()),
            "Loaded persisted token state"
        );

        Ok(Self {
            credential,
            token_url: token_url.into(),
            refresh_url: refresh_url.into(),
            transport,
            store,
            clock,
            tokens: ArcSwap::from_pointee(tokens),
            renewal: Mutex::new(RenewalSlot::default()),
            renewals: AtomicU64::new(0),
        })
    }

    /// Snapshot of the current token state.
    pub fn tokens(&self) -> TokenState {
        self.tokens.load().as_ref().clone()
    }

    pub fn state(&self) -> AuthState {
        self.tokens.load().state(self.clock.now_millis())
    }

    pub fn access_token(&self) -> Option<String> {
        self.tokens.load().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.tokens.load().refresh_token.clone()
    }

    fn usable_token(&self) -> Option<String> {
        let tokens = self.tokens.load();
        if tokens.is_usable(self.clock.now_millis()) {
            tokens.access_token.clone()
        } else {
            None
        }
    }

    /// Make sure a usable access token is held, renewing it if needed, and
    /// return it.
    ///
    /// Renewal tries the refresh grant first when a refresh token is held and
    /// falls back to the credential grant on any refresh failure. Only a
    /// failed credential grant is reported.
    pub async fn ensure_valid(&self) -> AuthResult<String> {
        if let Some(token) = self.usable_token() {
            return Ok(token);
        }

        let observed = self.renewals.load(Ordering::Acquire);
        let mut slot = self.renewal.lock().await;
        if let Some(outcome) = Self::joined_outcome(&slot, observed) {
            tracing::debug!(success = outcome.is_ok(), "Sharing concurrent renewal outcome");
            return outcome;
        }
        if let Some(token) = self.usable_token() {
            return Ok(token);
        }

        self.renew_and_publish(&mut slot).await
    }

    /// Renew after the server rejected `rejected_token` with a 401.
    ///
    /// Skips the network when another caller already replaced that token.
    pub async fn force_renew(&self, rejected_token: &str) -> AuthResult<String> {
        let observed = self.renewals.load(Ordering::Acquire);
        let mut slot = self.renewal.lock().await;
        if let Some(outcome) = Self::joined_outcome(&slot, observed) {
            return outcome;
        }

        let tokens = self.tokens.load_full();
        if tokens.access_token.as_deref() != Some(rejected_token)
            && tokens.is_usable(self.clock.now_millis())
        {
            if let Some(token) = tokens.access_token.clone() {
                tracing::debug!("Rejected token already replaced");
                return Ok(token);
            }
        }

        tracing::info!("Access token rejected by server, renewing");
        self.renew_and_publish(&mut slot).await
    }

    /// The outcome of a renewal that completed while the caller waited on the
    /// gate, if any.
    fn joined_outcome(slot: &RenewalSlot, observed: u64) -> Option<AuthResult<String>> {
        if slot.generation == observed {
            return None;
        }
        slot.outcome.clone()
    }

    async fn renew_and_publish(&self, slot: &mut RenewalSlot) -> AuthResult<String> {
        let outcome = self.renew().await;
        slot.generation += 1;
        slot.outcome = Some(outcome.clone());
        self.renewals.store(slot.generation, Ordering::Release);
        outcome
    }

    /// Run the credential grant unconditionally.
    pub async fn authenticate(&self) -> AuthResult<()> {
        let _gate = self.renewal.lock().await;
        self.credential_grant().await.map(|_| ())
    }

    /// Run the refresh grant unconditionally. The refresh token is kept.
    pub async fn refresh(&self) -> AuthResult<()> {
        let _gate = self.renewal.lock().await;
        let refresh_token = self.refresh_token().ok_or(AuthError::MissingRefreshToken)?;
        self.refresh_grant(&refresh_token).await.map(|_| ())
    }

    // Callers must hold the renewal gate.
    async fn renew(&self) -> AuthResult<String> {
        match self.refresh_token() {
            Some(refresh_token) => match self.refresh_grant(&refresh_token).await {
                Ok(token) => return Ok(token),
                Err(e) => {
                    tracing::warn!(error = %e, "Token refresh failed, falling back to credential grant");
                }
            },
            None => tracing::debug!("No refresh token held, using credential grant"),
        }

        self.credential_grant().await
    }

    async fn credential_grant(&self) -> AuthResult<String> {
        let request = RequestDescriptor::post(self.token_url.as_str()).with_json(json!({
            "email": self.credential.email,
            "password": self.credential.password,
        }));

        let grant = self
            .transport
            .send(&request)
            .await
            .map_err(GrantFailure::from)
            .and_then(|resp| resp.json::<TokenGrant>().map_err(GrantFailure::from));

        let grant = match grant {
            Ok(grant) => grant,
            Err(e) => {
                metrics::record_grant("credential", false);
                tracing::warn!(email = %self.credential.email, error = %e, "Credential grant failed");
                return Err(AuthError::Authentication(Arc::new(e)));
            }
        };
        metrics::record_grant("credential", true);

        let token = grant.access_token.clone();
        self.tokens.store(Arc::new(TokenState {
            access_token: Some(grant.access_token),
            access_token_expiry: Some(grant.expires_in),
            refresh_token: Some(grant.refresh_token),
        }));
        self.persist_all();

        tracing::info!(
            email = %self.credential.email,
            expires_at = grant.expires_in,
            "Authenticated"
        );
        Ok(token)
    }

    async fn refresh_grant(&self, refresh_token: &str) -> AuthResult<String> {
        let request = RequestDescriptor::post(self.refresh_url.as_str())
            .with_json(json!({ "refreshToken": refresh_token }));

        let grant = self
            .transport
            .send(&request)
            .await
            .map_err(GrantFailure::from)
            .and_then(|resp| resp.json::<RefreshGrant>().map_err(GrantFailure::from));

        let grant = match grant {
            Ok(grant) => grant,
            Err(e) => {
                metrics::record_grant("refresh", false);
                return Err(AuthError::TokenRefresh(Arc::new(e)));
            }
        };
        metrics::record_grant("refresh", true);

        let token = grant.access_token.clone();
        let current = self.tokens.load_full();
        self.tokens.store(Arc::new(TokenState {
            access_token: Some(grant.access_token),
            access_token_expiry: Some(grant.expires_in),
            refresh_token: current.refresh_token.clone(),
        }));
        self.persist_access();

        tracing::info!(expires_at = grant.expires_in, "Access token refreshed");
        Ok(token)
    }

    fn persist_all(&self) {
        self.persist_access();
        if let Some(refresh_token) = self.tokens.load().refresh_token.as_deref() {
            self.persist(TokenField::RefreshToken, refresh_token);
        }
    }

    fn persist_access(&self) {
        let tokens = self.tokens.load();
        if let (Some(token), Some(expiry)) = (&tokens.access_token, tokens.access_token_expiry) {
            self.persist(TokenField::AccessToken, token);
            self.persist(TokenField::AccessTokenExpiry, &expiry.to_string());
        }
    }

    fn persist(&self, field: TokenField, value: &str) {
        // The in-memory state stays authoritative for this process.
        if let Err(e) = self.store.save(field, value) {
            tracing::warn!(key = field.key(), error = %e, "Failed to persist token entry");
        }
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("email", &self.credential.email)
            .field("token_url", &self.token_url)
            .field("refresh_url", &self.refresh_url)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::resilience::RetryPolicy;
    use crate::storage::MemoryTokenStore;

    fn authenticator(store: Arc<MemoryTokenStore>, clock: Arc<ManualClock>) -> Authenticator {
        let transport = Arc::new(RetryingTransport::new(
            reqwest::Client::new(),
            RetryPolicy::no_retries(),
        ));
        Authenticator::new(
            Credential::new("a@x.com", "p"),
            "http://127.0.0.1:9/auth/token",
            "http://127.0.0.1:9/auth/refresh-token",
            transport,
            store,
            clock,
        )
        .unwrap()
    }

    #[test]
    fn test_loads_persisted_state() {
        let store = Arc::new(MemoryTokenStore::new());
        store.save(TokenField::AccessToken, "T1").unwrap();
        store.save(TokenField::AccessTokenExpiry, "5000").unwrap();
        store.save(TokenField::RefreshToken, "R1").unwrap();
        let clock = Arc::new(ManualClock::new(1_000));

        let auth = authenticator(store, clock.clone());
        assert_eq!(auth.state(), AuthState::Authenticated);
        assert_eq!(auth.access_token().as_deref(), Some("T1"));
        assert_eq!(auth.refresh_token().as_deref(), Some("R1"));

        clock.set(5_000);
        assert_eq!(auth.state(), AuthState::Expired);
    }

    #[tokio::test]
    async fn test_usable_token_needs_no_network() {
        let store = Arc::new(MemoryTokenStore::new());
        store.save(TokenField::AccessToken, "T1").unwrap();
        store.save(TokenField::AccessTokenExpiry, "5000").unwrap();

        // The grant URLs point at a closed port; any network call would fail.
        let auth = authenticator(store, Arc::new(ManualClock::new(0)));
        assert_eq!(auth.ensure_valid().await.unwrap(), "T1");
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token() {
        let auth = authenticator(
            Arc::new(MemoryTokenStore::new()),
            Arc::new(ManualClock::new(0)),
        );
        assert!(matches!(
            auth.refresh().await,
            Err(AuthError::MissingRefreshToken)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_authentication_error() {
        let auth = authenticator(
            Arc::new(MemoryTokenStore::new()),
            Arc::new(ManualClock::new(0)),
        );
        let err = auth.ensure_valid().await.unwrap_err();
        match err {
            AuthError::Authentication(failure) => {
                assert!(matches!(failure.as_ref(), GrantFailure::Transport(_)))
            }
            other => panic!("expected authentication error, got {:?}", other),
        }
        assert_eq!(auth.state(), AuthState::Unauthenticated);
    }
}
