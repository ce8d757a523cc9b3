//! HTTP transport with bounded retries.

use std::time::Duration;

use reqwest::Client;

use crate::config::ApiConfig;
use crate::observability::metrics;
use crate::resilience::RetryPolicy;
use crate::transport::{HttpResponse, RequestDescriptor, TransportError};

/// Executes a single logical HTTP call with retry and backoff on transient failures.
#[derive(Debug, Clone)]
pub struct RetryingTransport {
    client: Client,
    policy: RetryPolicy,
}

impl RetryingTransport {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Build the underlying HTTP client from API settings.
    pub fn from_config(api: &ApiConfig, policy: RetryPolicy) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_millis(api.timeout_ms))
            .user_agent(api.user_agent.clone())
            .build()?;
        Ok(Self::new(client, policy))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send the request, retrying retryable failures until the attempt budget
    /// is spent. Non-success statuses are returned as errors.
    pub async fn send(&self, descriptor: &RequestDescriptor) -> Result<HttpResponse, TransportError> {
        let attempts = self.policy.max_attempts();
        let mut attempt = 0;

        loop {
            let outcome = self.attempt(descriptor).await;

            let retryable = match &outcome {
                Ok(_) => false,
                Err(TransportError::Network(e)) => self.policy.is_retryable_network_error(e),
                Err(TransportError::Server { status, .. })
                | Err(TransportError::Client { status, .. }) => {
                    self.policy.is_retryable_status(*status)
                }
                Err(TransportError::Build(_)) => false,
            };

            if !retryable || attempt + 1 >= attempts {
                if let Err(e) = &outcome {
                    tracing::debug!(
                        method = %descriptor.method,
                        url = %descriptor.url,
                        attempts = attempt + 1,
                        error = %e,
                        "Request failed"
                    );
                }
                return outcome;
            }

            let delay = self.policy.delay_after(attempt);
            tracing::info!(
                method = %descriptor.method,
                url = %descriptor.url,
                attempt = attempt + 1,
                delay = ?delay,
                status = ?outcome.as_ref().err().and_then(TransportError::status),
                "Retrying request"
            );
            metrics::record_retry();
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn attempt(&self, descriptor: &RequestDescriptor) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(descriptor.method.clone(), &descriptor.url)
            .headers(descriptor.headers.clone());
        if let Some(body) = &descriptor.body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) if e.is_builder() => {
                return Err(TransportError::Build(e.to_string()));
            }
            Err(e) => {
                metrics::record_attempt("network");
                return Err(TransportError::Network(e));
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                metrics::record_attempt("network");
                return Err(TransportError::Network(e));
            }
        };

        if status.is_success() {
            metrics::record_attempt("success");
            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        } else {
            metrics::record_attempt(if status.is_server_error() { "5xx" } else { "4xx" });
            Err(TransportError::from_status(status, body))
        }
    }
}
