//! Wire types for the router backend's `/route`, `/health` and `/metrics` endpoints.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which model tier handled a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// Fast, cheap model tier
    System1,
    /// Deep, expensive model tier
    System2,
}

impl Complexity {
    pub fn label(&self) -> &'static str {
        match self {
            Complexity::System1 => "System 1",
            Complexity::System2 => "System 2",
        }
    }
}

/// Body of `POST /route`.
///
/// Optional fields are sent as explicit `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub query: String,
    pub system_prompt: Option<String>,
    pub force_model: Option<String>,
}

impl RouteRequest {
    /// Build a request, mapping blank optional parameters to `None`.
    pub fn new(
        query: impl Into<String>,
        system_prompt: Option<&str>,
        force_model: Option<&str>,
    ) -> Self {
        fn non_blank(value: Option<&str>) -> Option<String> {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        Self {
            query: query.into(),
            system_prompt: non_blank(system_prompt),
            force_model: non_blank(force_model),
        }
    }
}

/// Token accounting reported for a routed query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Successful `POST /route` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    /// Model-generated answer text
    pub answer: String,
    /// Identifier of the model that produced the answer
    pub model_used: String,
    pub complexity: Complexity,
    /// Classifier confidence in the chosen tier (0.0-1.0)
    pub classification_confidence: f64,
    /// Classifier strategy that made the decision
    pub classifier_used: String,
    /// End-to-end backend latency
    pub latency_ms: f64,
    #[serde(default)]
    pub token_usage: TokenUsage,
    pub estimated_cost_usd: f64,
}

/// Aggregate usage returned by `GET /metrics`. Replaced wholesale on every fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_requests: u64,
    pub avg_latency_ms: f64,
    pub total_estimated_cost_usd: f64,
    pub total_tokens_used: u64,
    #[serde(default)]
    pub requests_by_complexity: HashMap<String, u64>,
    #[serde(default)]
    pub requests_by_model: HashMap<String, u64>,
    pub avg_cost_per_request_usd: f64,
    #[serde(default)]
    pub classifier_distribution: HashMap<String, u64>,
}

/// Backend identity returned by `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub classifier_mode: String,
    pub system1_model: String,
    pub system2_model: String,
}

/// Error body returned by the backend on non-success responses.
///
/// `detail` is usually a string, but validation failures carry a list of issues,
/// so it is kept as raw JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}
