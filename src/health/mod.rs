//! Backend health monitoring.
//!
//! `HealthMonitor` polls `GET /health` immediately on `start()` and then on a fixed
//! interval until `stop()` (or drop). A failed poll flips the unreachable flag but keeps
//! the last-known status, so the display can tell "never connected" from "connection
//! lost" from "healthy".

mod config;
mod state;

#[cfg(test)]
mod tests;

pub use config::*;
pub use state::*;

use crate::api::{HealthStatus, RouterBackend};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct PollTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Periodic health poller with an explicit start/stop lifecycle.
pub struct HealthMonitor {
    backend: Arc<dyn RouterBackend>,
    config: HealthCheckConfig,
    state: Arc<RwLock<HealthSnapshot>>,
    task: Mutex<Option<PollTask>>,
}

impl HealthMonitor {
    pub fn new(backend: Arc<dyn RouterBackend>, config: HealthCheckConfig) -> Self {
        Self {
            backend,
            config,
            state: Arc::new(RwLock::new(HealthSnapshot::default())),
            task: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &HealthCheckConfig {
        &self.config
    }

    /// Poll once and return the resulting connection state.
    pub async fn poll_once(&self) -> ConnectionState {
        poll(self.backend.as_ref(), &self.state).await
    }

    /// Start the background poll loop. Must be called within a tokio runtime.
    ///
    /// Returns false if the loop is already running.
    pub fn start(&self) -> bool {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            tracing::debug!("Health monitor already running");
            return false;
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let backend = Arc::clone(&self.backend);
        let state = Arc::clone(&self.state);
        let interval_seconds = self.config.interval_seconds.max(1);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            tracing::info!(interval_seconds, "Health monitor started");

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::info!("Health monitor stopped");
                        break;
                    }
                    _ = async {
                        interval.tick().await;
                        poll(backend.as_ref(), &state).await;
                    } => {}
                }
            }
        });

        *task = Some(PollTask { cancel, handle });
        true
    }

    /// Stop the poll loop. Safe to call repeatedly or before `start()`.
    pub fn stop(&self) {
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.cancel.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|t| !t.cancel.is_cancelled() && !t.handle.is_finished())
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Last-known backend status, retained across failed polls.
    pub fn status(&self) -> Option<HealthStatus> {
        self.snapshot().status
    }

    pub fn is_unreachable(&self) -> bool {
        self.snapshot().unreachable
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.snapshot().connection_state()
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll(backend: &dyn RouterBackend, state: &RwLock<HealthSnapshot>) -> ConnectionState {
    let result = backend.health().await;
    if let Err(e) = &result {
        tracing::debug!(error = %e, "Health poll failed");
    }

    let mut snapshot = state.write().unwrap_or_else(PoisonError::into_inner);
    let old_state = snapshot.connection_state();
    if let Some(new_state) = snapshot.apply_result(result) {
        tracing::info!(?old_state, ?new_state, "Backend connection state changed");
    }
    snapshot.connection_state()
}
