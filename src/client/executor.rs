//! Authenticated request execution.

use std::sync::Arc;

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::auth::Authenticator;
use crate::error::{SdkError, SdkResult};
use crate::transport::{HttpResponse, RequestDescriptor, RetryingTransport, TransportError};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Attaches a bearer token to each call and runs it through the retrying transport.
#[derive(Debug)]
pub struct AuthenticatedRequestExecutor {
    authenticator: Arc<Authenticator>,
    transport: Arc<RetryingTransport>,
    reauthenticate_on_unauthorized: bool,
}

impl AuthenticatedRequestExecutor {
    pub fn new(authenticator: Arc<Authenticator>, transport: Arc<RetryingTransport>) -> Self {
        Self {
            authenticator,
            transport,
            reauthenticate_on_unauthorized: true,
        }
    }

    /// When set, a 401 from the call itself triggers one token renewal and a
    /// single replay of the call.
    pub fn with_reauthentication(mut self, enabled: bool) -> Self {
        self.reauthenticate_on_unauthorized = enabled;
        self
    }

    pub fn authenticator(&self) -> &Arc<Authenticator> {
        &self.authenticator
    }

    /// Execute `method url` with an optional JSON body.
    ///
    /// Authentication failures propagate unchanged; transport failures are
    /// wrapped with the method and URL.
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> SdkResult<HttpResponse> {
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!("sdk_request", %request_id, %method, url);

        self.execute_once_reauthenticated(request_id, method, url, body)
            .instrument(span)
            .await
    }

    async fn execute_once_reauthenticated(
        &self,
        request_id: Uuid,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> SdkResult<HttpResponse> {
        let token = self.authenticator.ensure_valid().await?;

        let request_id = HeaderValue::from_str(&request_id.to_string()).map_err(|e| {
            SdkError::request(method.clone(), url, TransportError::Build(e.to_string()))
        })?;
        let descriptor = RequestDescriptor::new(method.clone(), url)
            .with_body(body)
            .with_header(HeaderName::from_static(REQUEST_ID_HEADER), request_id);

        match self.send_with_token(&descriptor, &token).await {
            Err(e) if e.is_unauthorized() && self.reauthenticate_on_unauthorized => {
                tracing::info!("Resource call returned 401, renewing token and replaying once");
                let token = self.authenticator.force_renew(&token).await?;
                self.send_with_token(&descriptor, &token)
                    .await
                    .map_err(|e| SdkError::request(method, url, e))
            }
            other => other.map_err(|e| SdkError::request(method, url, e)),
        }
    }

    async fn send_with_token(
        &self,
        descriptor: &RequestDescriptor,
        token: &str,
    ) -> Result<HttpResponse, TransportError> {
        let request = descriptor.clone().bearer(token)?;
        self.transport.send(&request).await
    }

    /// Execute and decode the JSON response body.
    pub async fn execute_json(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> SdkResult<Value> {
        let response = self.execute(method, url, body).await?;
        response.json().map_err(|source| SdkError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
