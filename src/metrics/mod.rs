//! # Metrics Polling
//!
//! Best-effort fetch of the backend's aggregate usage summary.
//!
//! The summary is replaced wholesale on every successful fetch and is never mutated
//! locally. Failures are logged and otherwise ignored: the previous summary (or none)
//! stays in place, and there is no retry.

use crate::api::{MetricsSummary, RouterBackend};
use chrono::{DateTime, Utc};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Default)]
struct MetricsState {
    summary: Option<MetricsSummary>,
    last_updated: Option<DateTime<Utc>>,
}

/// Holds the most recent [`MetricsSummary`] fetched from the backend.
pub struct MetricsPoller {
    backend: Arc<dyn RouterBackend>,
    state: RwLock<MetricsState>,
}

impl MetricsPoller {
    pub fn new(backend: Arc<dyn RouterBackend>) -> Self {
        Self {
            backend,
            state: RwLock::new(MetricsState::default()),
        }
    }

    /// Fetch the summary once. Returns true if the stored value was replaced.
    pub async fn refresh(&self) -> bool {
        match self.backend.metrics().await {
            Ok(summary) => {
                tracing::debug!(
                    total_requests = summary.total_requests,
                    "Metrics summary refreshed"
                );
                let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
                state.summary = Some(summary);
                state.last_updated = Some(Utc::now());
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "Metrics refresh failed, keeping previous summary");
                false
            }
        }
    }

    /// Latest successfully fetched summary, if any.
    pub fn summary(&self) -> Option<MetricsSummary> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .summary
            .clone()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last_updated
    }

    /// Forget the stored summary (session reset).
    pub fn reset(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = MetricsState::default();
    }
}
