//! Shared test utilities for router client integration tests.
//!
//! Provides canned backend payloads and helpers for mounting them on a
//! `wiremock::MockServer`.

#![allow(dead_code)]

use router_client::config::{ClientConfig, StorageKind};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Payload Builders
// =============================================================================

/// A `/route` success body for a fast-tier answer.
pub fn route_body(answer: &str) -> Value {
    json!({
        "answer": answer,
        "model_used": "gemini-2.5-flash-lite",
        "complexity": "system1",
        "classification_confidence": 0.92,
        "classifier_used": "heuristic",
        "latency_ms": 143.7,
        "token_usage": {
            "prompt_tokens": 12,
            "completion_tokens": 9,
            "total_tokens": 21
        },
        "estimated_cost_usd": 0.0000042
    })
}

/// A `/route` success body for a deep-tier answer.
pub fn deep_route_body(answer: &str) -> Value {
    let mut body = route_body(answer);
    body["model_used"] = json!("gemini-2.5-flash");
    body["complexity"] = json!("system2");
    body["classifier_used"] = json!("llm");
    body
}

pub fn health_body(version: &str) -> Value {
    json!({
        "status": "healthy",
        "version": version,
        "classifier_mode": "hybrid",
        "system1_model": "gemini-2.5-flash-lite",
        "system2_model": "gemini-2.5-flash"
    })
}

pub fn metrics_body(total_requests: u64) -> Value {
    json!({
        "total_requests": total_requests,
        "avg_latency_ms": 812.4,
        "total_estimated_cost_usd": 0.0153,
        "total_tokens_used": 18_340,
        "requests_by_complexity": {"system1": total_requests, "system2": 0},
        "requests_by_model": {"gemini-2.5-flash-lite": total_requests},
        "avg_cost_per_request_usd": 0.0004,
        "classifier_distribution": {"heuristic": total_requests}
    })
}

// =============================================================================
// Mock Server Helpers
// =============================================================================

pub async fn mount_health(server: &MockServer, version: &str) {
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(health_body(version)))
        .mount(server)
        .await;
}

pub async fn mount_metrics(server: &MockServer, total_requests: u64) {
    Mock::given(method("GET"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(metrics_body(total_requests)))
        .mount(server)
        .await;
}

/// Client config pointing at `base_url` with in-memory session storage.
pub fn memory_config(base_url: &str) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.server.base_url = base_url.to_string();
    config.session.storage = StorageKind::Memory;
    config
}

/// A URL nothing listens on.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";
