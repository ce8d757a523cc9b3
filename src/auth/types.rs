//! Credential and token state types.

use std::fmt;

use serde::Deserialize;

/// Email/password pair used for the credential grant.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub email: String,
    pub password: String,
}

impl Credential {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Tokens held by the authenticator. All values are opaque.
///
/// `access_token` and `access_token_expiry` are always written together.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TokenState {
    pub access_token: Option<String>,
    /// Absolute expiry in epoch milliseconds.
    pub access_token_expiry: Option<i64>,
    pub refresh_token: Option<String>,
}

impl TokenState {
    /// A token is usable when present and `now` is strictly before its expiry.
    /// A token without an expiry is never usable.
    pub fn is_usable(&self, now_millis: i64) -> bool {
        match (&self.access_token, self.access_token_expiry) {
            (Some(_), Some(expiry)) => now_millis < expiry,
            _ => false,
        }
    }

    pub fn state(&self, now_millis: i64) -> AuthState {
        if self.access_token.is_none() {
            AuthState::Unauthenticated
        } else if self.is_usable(now_millis) {
            AuthState::Authenticated
        } else {
            AuthState::Expired
        }
    }
}

impl fmt::Debug for TokenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenState")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Authentication state derived from `TokenState` and the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No access token has ever been obtained (or persisted).
    Unauthenticated,
    /// An access token is present and unexpired.
    Authenticated,
    /// An access token is present but past its expiry.
    Expired,
}

/// Body of a successful credential grant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry in epoch milliseconds.
    pub expires_in: i64,
}

/// Body of a successful refresh grant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshGrant {
    pub access_token: String,
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        let mut tokens = TokenState::default();
        assert_eq!(tokens.state(0), AuthState::Unauthenticated);

        tokens.access_token = Some("T1".into());
        tokens.access_token_expiry = Some(1_000);
        assert_eq!(tokens.state(999), AuthState::Authenticated);
        assert_eq!(tokens.state(1_000), AuthState::Expired);
    }

    #[test]
    fn test_token_without_expiry_is_not_usable() {
        let tokens = TokenState {
            access_token: Some("T1".into()),
            ..TokenState::default()
        };
        assert!(!tokens.is_usable(0));
        assert_eq!(tokens.state(0), AuthState::Expired);
    }

    #[test]
    fn test_secrets_are_redacted_in_debug() {
        let tokens = TokenState {
            access_token: Some("secret-access".into()),
            access_token_expiry: Some(1),
            refresh_token: Some("secret-refresh".into()),
        };
        let credential = Credential::new("a@x.com", "hunter2");

        let rendered = format!("{:?} {:?}", tokens, credential);
        assert!(!rendered.contains("secret"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("a@x.com"));
    }

    #[test]
    fn test_grant_wire_format() {
        let grant: TokenGrant = serde_json::from_str(
            r#"{"accessToken":"T1","refreshToken":"R1","expiresIn":1800000}"#,
        )
        .unwrap();
        assert_eq!(grant.access_token, "T1");
        assert_eq!(grant.refresh_token, "R1");
        assert_eq!(grant.expires_in, 1_800_000);
    }
}
