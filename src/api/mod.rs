//! Router backend contract.
//!
//! This module provides the `RouterBackend` trait, the remote-call capability every
//! other component depends on, together with the wire types and the reqwest-based
//! `HttpBackend` implementation.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub mod error;
pub mod http;
pub mod types;

pub use error::{ApiError, GENERIC_FAILURE_MESSAGE};
pub use http::HttpBackend;
pub use types::{
    Complexity, ErrorBody, HealthStatus, MetricsSummary, RouteRequest, RouteResponse, TokenUsage,
};

/// Remote calls consumed by the client.
///
/// # Object Safety
///
/// The trait is object-safe and used as `Arc<dyn RouterBackend>`, which lets tests
/// substitute an in-memory fake for the HTTP transport.
///
/// # Cancellation
///
/// Only `route` is cancellable. Implementations must watch `cancel` and return
/// `ApiError::Cancelled` promptly once it fires, abandoning the in-flight call.
#[async_trait]
pub trait RouterBackend: Send + Sync + 'static {
    /// `POST /route`: classify and answer a query.
    async fn route(
        &self,
        request: &RouteRequest,
        cancel: &CancellationToken,
    ) -> Result<RouteResponse, ApiError>;

    /// `GET /health`: backend liveness and identity.
    async fn health(&self) -> Result<HealthStatus, ApiError>;

    /// `GET /metrics`: aggregate usage summary.
    async fn metrics(&self) -> Result<MetricsSummary, ApiError>;
}
