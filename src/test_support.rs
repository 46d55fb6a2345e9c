//! Shared fixtures for unit tests: sample payloads and a scriptable in-memory backend.

use crate::api::{
    ApiError, Complexity, HealthStatus, MetricsSummary, RouteRequest, RouteResponse,
    RouterBackend, TokenUsage,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub(crate) fn sample_response(answer: &str) -> RouteResponse {
    RouteResponse {
        answer: answer.to_string(),
        model_used: "gemini-2.5-flash-lite".to_string(),
        complexity: Complexity::System1,
        classification_confidence: 0.9,
        classifier_used: "heuristic".to_string(),
        latency_ms: 120.5,
        token_usage: TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 20,
            total_tokens: 30,
        },
        estimated_cost_usd: 0.000005,
    }
}

pub(crate) fn sample_health(version: &str) -> HealthStatus {
    HealthStatus {
        status: "healthy".to_string(),
        version: version.to_string(),
        classifier_mode: "hybrid".to_string(),
        system1_model: "gemini-2.5-flash-lite".to_string(),
        system2_model: "gemini-2.5-flash".to_string(),
    }
}

pub(crate) fn sample_metrics(total_requests: u64) -> MetricsSummary {
    MetricsSummary {
        total_requests,
        avg_latency_ms: 200.0,
        total_tokens_used: total_requests * 30,
        ..Default::default()
    }
}

/// Scripted reply for one query.
#[derive(Clone)]
pub(crate) struct Scripted {
    pub result: Result<RouteResponse, ApiError>,
    pub delay: Duration,
    /// Keep running after cancellation, like a transport that delivers late
    pub ignore_cancel: bool,
}

impl Scripted {
    pub fn ok(answer: &str, delay: Duration) -> Self {
        Self {
            result: Ok(sample_response(answer)),
            delay,
            ignore_cancel: false,
        }
    }

    pub fn err(error: ApiError, delay: Duration) -> Self {
        Self {
            result: Err(error),
            delay,
            ignore_cancel: false,
        }
    }

    pub fn late(mut self) -> Self {
        self.ignore_cancel = true;
        self
    }
}

pub(crate) struct FakeBackend {
    routes: Mutex<HashMap<String, Scripted>>,
    health: Mutex<Result<HealthStatus, ApiError>>,
    metrics: Mutex<Result<MetricsSummary, ApiError>>,
    requests: Mutex<Vec<RouteRequest>>,
    route_calls: AtomicUsize,
    health_calls: AtomicUsize,
    metrics_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            health: Mutex::new(Ok(sample_health("1.0.0"))),
            metrics: Mutex::new(Ok(sample_metrics(0))),
            requests: Mutex::new(Vec::new()),
            route_calls: AtomicUsize::new(0),
            health_calls: AtomicUsize::new(0),
            metrics_calls: AtomicUsize::new(0),
        }
    }

    /// Unscripted queries answer immediately with `answer to <query>`.
    pub fn script(&self, query: &str, reply: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .insert(query.to_string(), reply);
    }

    pub fn set_health(&self, result: Result<HealthStatus, ApiError>) {
        *self.health.lock().unwrap() = result;
    }

    pub fn set_metrics(&self, result: Result<MetricsSummary, ApiError>) {
        *self.metrics.lock().unwrap() = result;
    }

    pub fn requests(&self) -> Vec<RouteRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn route_calls(&self) -> usize {
        self.route_calls.load(Ordering::SeqCst)
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub fn metrics_calls(&self) -> usize {
        self.metrics_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RouterBackend for FakeBackend {
    async fn route(
        &self,
        request: &RouteRequest,
        cancel: &CancellationToken,
    ) -> Result<RouteResponse, ApiError> {
        self.route_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let reply = self
            .routes
            .lock()
            .unwrap()
            .get(&request.query)
            .cloned()
            .unwrap_or_else(|| {
                Scripted::ok(&format!("answer to {}", request.query), Duration::ZERO)
            });

        let work = async {
            if !reply.delay.is_zero() {
                tokio::time::sleep(reply.delay).await;
            }
            reply.result.clone()
        };

        if reply.ignore_cancel {
            return work.await;
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            result = work => result,
        }
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        self.health.lock().unwrap().clone()
    }

    async fn metrics(&self) -> Result<MetricsSummary, ApiError> {
        self.metrics_calls.fetch_add(1, Ordering::SeqCst);
        self.metrics.lock().unwrap().clone()
    }
}
