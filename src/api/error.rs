//! Error types for calls against the router backend.

use thiserror::Error;

/// Generic message shown when no better description is available.
pub const GENERIC_FAILURE_MESSAGE: &str = "Request failed";

/// Errors that can occur while talking to the router backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The call was aborted through its cancellation token.
    #[error("request cancelled")]
    Cancelled,

    /// Request exceeded its deadline.
    #[error("request timeout after {0}s")]
    Timeout(u64),

    /// Network connectivity error (DNS, connection refused, reset).
    #[error("network error: {0}")]
    Network(String),

    /// Backend answered with a non-success status.
    ///
    /// `message` is already resolved from the response body.
    #[error("backend error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Backend answered 2xx but the body does not match the contract.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Text suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Upstream { message, .. } => message.clone(),
            ApiError::InvalidResponse(_) => "Invalid response from router backend".to_string(),
            ApiError::Cancelled | ApiError::Timeout(_) | ApiError::Network(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }

    /// Classify a reqwest error.
    pub(crate) fn from_reqwest(e: reqwest::Error, timeout_seconds: u64) -> Self {
        if e.is_timeout() {
            ApiError::Timeout(timeout_seconds)
        } else if e.is_decode() {
            ApiError::InvalidResponse(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}
