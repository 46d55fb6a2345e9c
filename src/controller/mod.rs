//! Request lifecycle: single-flight, last-submission-wins query submission.
//!
//! Every `submit` allocates a fresh generation number and cancellation token and cancels
//! the previous submission's token. When a call resolves, its continuation checks (under
//! the same lock that guards the in-flight slot) whether it is still the current
//! submission; a superseded call exits without touching session state, metrics or
//! notifications, even if its transport ignored the cancellation and delivered late.


use crate::api::{ApiError, RouteRequest, RouterBackend};
use crate::metrics::MetricsPoller;
use crate::notify::NotificationCenter;
use crate::session::{HistoryEntry, ResponseEntry, SessionStore};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Longest query the backend accepts, in characters.
pub const MAX_QUERY_CHARS: usize = 10_000;

/// Submission rejected before any request was issued.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("query is empty")]
    EmptyQuery,

    #[error("query is {chars} characters long, the limit is {max}")]
    QueryTooLong { chars: usize, max: usize },
}

/// Terminal result of one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The answer was recorded in the session.
    Completed(ResponseEntry),
    /// The request failed; `message` was pushed as an error notification.
    Failed { message: String },
    /// Superseded by a newer submission or cancelled; nothing was recorded.
    Discarded,
}

struct InFlight {
    generation: u64,
    token: CancellationToken,
}

/// Holds a submission's claim on the in-flight slot while its route call is pending.
///
/// If the `submit` future is dropped before the call resolves, the guard cancels the
/// token and frees the slot, unless a newer submission has already taken it.
struct SubmissionGuard<'a> {
    in_flight: &'a Mutex<Option<InFlight>>,
    generation: u64,
    token: CancellationToken,
    armed: bool,
}

impl SubmissionGuard<'_> {
    /// The route call resolved; the caller now owns the slot release.
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.token.cancel();

        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if in_flight
            .as_ref()
            .is_some_and(|f| f.generation == self.generation)
        {
            *in_flight = None;
            tracing::debug!(
                generation = self.generation,
                "Submission dropped before completion"
            );
        }
    }
}

/// Owns the single outstanding route request.
pub struct RequestLifecycleController {
    backend: Arc<dyn RouterBackend>,
    session: Arc<SessionStore>,
    metrics: Arc<MetricsPoller>,
    notifications: NotificationCenter,
    generation: AtomicU64,
    in_flight: Mutex<Option<InFlight>>,
    /// Pending query text owned by the input surface
    draft: RwLock<String>,
}

impl RequestLifecycleController {
    pub fn new(
        backend: Arc<dyn RouterBackend>,
        session: Arc<SessionStore>,
        metrics: Arc<MetricsPoller>,
        notifications: NotificationCenter,
    ) -> Self {
        Self {
            backend,
            session,
            metrics,
            notifications,
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
            draft: RwLock::new(String::new()),
        }
    }

    /// Submit a query, cancelling any submission still in flight.
    ///
    /// Blank `system_prompt` / `force_model` are sent as null.
    pub async fn submit(
        &self,
        query: &str,
        system_prompt: Option<&str>,
        force_model: Option<&str>,
    ) -> Result<SubmitOutcome, SubmitError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SubmitError::EmptyQuery);
        }
        let chars = query.chars().count();
        if chars > MAX_QUERY_CHARS {
            return Err(SubmitError::QueryTooLong {
                chars,
                max: MAX_QUERY_CHARS,
            });
        }

        let request = RouteRequest::new(query, system_prompt, force_model);
        let mut guard = self.begin();
        let generation = guard.generation;
        let token = guard.token.clone();

        tracing::debug!(
            generation,
            query_chars = chars,
            force_model = ?request.force_model,
            "Submitting query"
        );

        let result = self.backend.route(&request, &token).await;
        guard.disarm();

        // Decide and apply under the in-flight lock so a newer submission cannot
        // start between the currency check and the session mutation.
        let outcome = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            let current = in_flight
                .as_ref()
                .is_some_and(|f| f.generation == generation);

            if !current || token.is_cancelled() {
                tracing::debug!(generation, "Discarding superseded submission");
                return Ok(SubmitOutcome::Discarded);
            }
            *in_flight = None;

            match result {
                Ok(response) => {
                    let entry = ResponseEntry {
                        query: request.query.clone(),
                        response,
                        timestamp: Utc::now(),
                    };
                    self.session.append_response(entry.clone());
                    self.session.append_history(HistoryEntry::from(&entry));
                    self.clear_draft();

                    tracing::info!(
                        generation,
                        model = %entry.response.model_used,
                        complexity = ?entry.response.complexity,
                        latency_ms = entry.response.latency_ms,
                        "Query routed"
                    );
                    SubmitOutcome::Completed(entry)
                }
                Err(ApiError::Cancelled) => {
                    tracing::debug!(generation, "Submission cancelled by transport");
                    SubmitOutcome::Discarded
                }
                Err(e) => {
                    tracing::warn!(generation, error = %e, "Query failed");
                    SubmitOutcome::Failed {
                        message: e.user_message(),
                    }
                }
            }
        };

        match &outcome {
            SubmitOutcome::Completed(_) => {
                self.metrics.refresh().await;
            }
            SubmitOutcome::Failed { message } => {
                self.notifications.error(message.clone());
            }
            SubmitOutcome::Discarded => {}
        }

        Ok(outcome)
    }

    /// Cancel the in-flight submission, if any. Returns true if one was cancelled.
    pub fn cancel(&self) -> bool {
        let previous = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match previous {
            Some(f) => {
                f.token.cancel();
                tracing::debug!(generation = f.generation, "Submission cancelled");
                true
            }
            None => false,
        }
    }

    /// True while a submission is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn draft(&self) -> String {
        self.draft
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        *self.draft.write().unwrap_or_else(PoisonError::into_inner) = text.into();
    }

    pub fn clear_draft(&self) {
        self.draft
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Claim the in-flight slot for a new submission, cancelling the previous one.
    fn begin(&self) -> SubmissionGuard<'_> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();

        let previous = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(InFlight {
                generation,
                token: token.clone(),
            });

        if let Some(previous) = previous {
            previous.token.cancel();
            tracing::debug!(
                superseded = previous.generation,
                by = generation,
                "Superseding in-flight submission"
            );
        }

        SubmissionGuard {
            in_flight: &self.in_flight,
            generation,
            token,
            armed: true,
        }
    }
}
