//! reqwest-backed implementation of [`RouterBackend`].

use super::{
    ApiError, ErrorBody, HealthStatus, MetricsSummary, RouteRequest, RouteResponse, RouterBackend,
    GENERIC_FAILURE_MESSAGE,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// HTTP transport for the router backend.
///
/// Route submissions carry no deadline; health and metrics polls are bounded by
/// `poll_timeout`.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    /// Base URL without trailing slash (e.g., "http://localhost:8000")
    base_url: String,
    /// Shared HTTP client for connection pooling
    client: Client,
    poll_timeout: Duration,
}

impl HttpBackend {
    /// Create a backend with a default HTTP client.
    pub fn new(base_url: &str, poll_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(base_url, client, poll_timeout))
    }

    /// Create a backend with a custom HTTP client (for testing).
    pub fn with_client(base_url: &str, client: Client, poll_timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            poll_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(self.url(path))
            .timeout(self.poll_timeout)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(e, self.poll_timeout.as_secs()))?;

        decode(response, self.poll_timeout.as_secs()).await
    }
}

/// Read a response body and map it to `T` or an [`ApiError`].
async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
    timeout_seconds: u64,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::from_reqwest(e, timeout_seconds))?;

    if !status.is_success() {
        return Err(ApiError::Upstream {
            status: status.as_u16(),
            message: error_message(status.as_u16(), &body),
        });
    }

    serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

/// Resolve a human-readable message from a non-success response body.
///
/// A string `detail` wins; a JSON body without one falls back to the status code;
/// an unparseable body yields the generic failure message.
pub fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: Some(serde_json::Value::String(detail)),
        }) if !detail.trim().is_empty() => detail,
        Ok(_) => format!("HTTP {}", status),
        Err(_) => GENERIC_FAILURE_MESSAGE.to_string(),
    }
}

#[async_trait]
impl RouterBackend for HttpBackend {
    async fn route(
        &self,
        request: &RouteRequest,
        cancel: &CancellationToken,
    ) -> Result<RouteResponse, ApiError> {
        let call = async {
            let response = self
                .client
                .post(self.url("/route"))
                .json(request)
                .send()
                .await
                .map_err(|e| ApiError::from_reqwest(e, 0))?;
            decode(response, 0).await
        };

        // Dropping `call` aborts the HTTP exchange.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            result = call => result,
        }
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_json("/health").await
    }

    async fn metrics(&self) -> Result<MetricsSummary, ApiError> {
        self.get_json("/metrics").await
    }
}
