//! Composition root: builds every component from [`ClientConfig`] and exposes the
//! session-level actions (clear, reset, restore) the presentation layer triggers.

use crate::api::{HttpBackend, RouterBackend};
use crate::config::{ClientConfig, ConfigError, StorageKind};
use crate::controller::{RequestLifecycleController, SubmitError, SubmitOutcome};
use crate::health::HealthMonitor;
use crate::metrics::MetricsPoller;
use crate::notify::NotificationCenter;
use crate::session::{FileStore, KeyValueStore, MemoryStore, RestoreOutcome, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors building a [`RouterClient`].
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// One interactive session against the router backend.
pub struct RouterClient {
    notifications: NotificationCenter,
    session: Arc<SessionStore>,
    metrics: Arc<MetricsPoller>,
    health: HealthMonitor,
    controller: Arc<RequestLifecycleController>,
}

impl RouterClient {
    /// Build a client talking HTTP to `config.server.base_url`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let backend = HttpBackend::new(
            &config.server.base_url,
            Duration::from_secs(config.server.poll_timeout_seconds),
        )?;
        let store: Arc<dyn KeyValueStore> = match config.session.storage {
            StorageKind::File => Arc::new(FileStore::new(config.session.state_dir.clone())),
            StorageKind::Memory => Arc::new(MemoryStore::new()),
        };

        tracing::debug!(
            base_url = %config.server.base_url,
            storage = ?config.session.storage,
            "Router client configured"
        );

        Ok(Self::with_parts(Arc::new(backend), store, config))
    }

    /// Build a client from explicit collaborators (for testing or embedding).
    pub fn with_parts(
        backend: Arc<dyn RouterBackend>,
        store: Arc<dyn KeyValueStore>,
        config: &ClientConfig,
    ) -> Self {
        let notifications =
            NotificationCenter::new(Duration::from_millis(config.notifications.ttl_ms));
        let session = Arc::new(if config.session.restore_on_start {
            SessionStore::open(store)
        } else {
            SessionStore::new(store)
        });
        let metrics = Arc::new(MetricsPoller::new(Arc::clone(&backend)));
        let health = HealthMonitor::new(Arc::clone(&backend), config.health_check.clone());
        let controller = Arc::new(RequestLifecycleController::new(
            backend,
            Arc::clone(&session),
            Arc::clone(&metrics),
            notifications.clone(),
        ));

        Self {
            notifications,
            session,
            metrics,
            health,
            controller,
        }
    }

    /// Start health polling (when enabled) and fetch the initial metrics summary.
    pub async fn start(&self) {
        if self.health.config().enabled {
            self.health.start();
        } else {
            tracing::info!("Health polling disabled");
        }
        self.metrics.refresh().await;
    }

    /// Cancel any in-flight submission and stop background polling.
    pub fn shutdown(&self) {
        self.controller.cancel();
        self.health.stop();
    }

    pub async fn submit(
        &self,
        query: &str,
        system_prompt: Option<&str>,
        force_model: Option<&str>,
    ) -> Result<SubmitOutcome, SubmitError> {
        self.controller
            .submit(query, system_prompt, force_model)
            .await
    }

    /// Empty the transcript and history, in memory and on disk.
    pub fn clear_history(&self) {
        self.session.clear();
    }

    /// Start over: drop the in-flight request, session, draft and metrics, then
    /// fetch fresh metrics.
    pub async fn reset_session(&self) {
        self.controller.cancel();
        self.session.clear();
        self.controller.clear_draft();
        self.metrics.reset();
        self.metrics.refresh().await;
    }

    /// Reload the persisted session and tell the user how it went.
    pub fn restore_session(&self) -> RestoreOutcome {
        let outcome = self.session.restore();
        match outcome {
            RestoreOutcome::Restored { responses, .. } => {
                self.notifications.success(format!(
                    "Restored {} response(s) from previous session",
                    responses
                ));
            }
            RestoreOutcome::NothingToRestore => {
                self.notifications.info("No previous session found");
            }
        }
        outcome
    }

    /// Whether to offer "restore previous session".
    pub fn has_stored_session(&self) -> bool {
        self.session.has_stored_session()
    }

    /// Copy the query of history entry `index` (0 = most recent) into the draft.
    pub fn recall(&self, index: usize) -> Option<String> {
        let query = self.session.history().get(index)?.query.clone();
        self.controller.set_draft(query.clone());
        Some(query)
    }

    pub fn is_loading(&self) -> bool {
        self.controller.is_loading()
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn metrics(&self) -> &MetricsPoller {
        &self.metrics
    }

    pub fn health(&self) -> &HealthMonitor {
        &self.health
    }

    pub fn controller(&self) -> &RequestLifecycleController {
        &self.controller
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationKind;
    use crate::session::{HistoryEntry, ResponseEntry};
    use crate::test_support::{sample_metrics, sample_response, FakeBackend, Scripted};
    use chrono::Utc;

    fn memory_config() -> ClientConfig {
        let mut config = ClientConfig::default();
        config.session.storage = StorageKind::Memory;
        config
    }

    fn seed(store: &Arc<MemoryStore>, queries: &[&str]) {
        let session = SessionStore::new(store.clone());
        for q in queries {
            let entry = ResponseEntry {
                query: q.to_string(),
                response: sample_response("seeded"),
                timestamp: Utc::now(),
            };
            session.append_history(HistoryEntry::from(&entry));
            session.append_response(entry);
        }
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let mut config = memory_config();
        config.server.base_url = "ftp://nope".to_string();
        assert!(matches!(
            RouterClient::from_config(&config),
            Err(ClientError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_restore_on_start_loads_previous_session() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, &["a", "b"]);

        let client =
            RouterClient::with_parts(Arc::new(FakeBackend::new()), store, &memory_config());
        assert_eq!(client.session().response_count(), 2);
        assert!(!client.has_stored_session());
    }

    #[tokio::test]
    async fn test_restore_session_notifies_count() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, &["a", "b", "c"]);
        let mut config = memory_config();
        config.session.restore_on_start = false;

        let client = RouterClient::with_parts(Arc::new(FakeBackend::new()), store, &config);
        assert!(client.session().is_empty());
        assert!(client.has_stored_session());

        let outcome = client.restore_session();
        assert_eq!(
            outcome,
            RestoreOutcome::Restored {
                responses: 3,
                history: 3
            }
        );
        let notice = &client.notifications().active()[0];
        assert_eq!(notice.kind, NotificationKind::Success);
        assert_eq!(
            notice.message,
            "Restored 3 response(s) from previous session"
        );
    }

    #[tokio::test]
    async fn test_restore_session_with_nothing_stored() {
        let client = RouterClient::with_parts(
            Arc::new(FakeBackend::new()),
            Arc::new(MemoryStore::new()),
            &memory_config(),
        );

        assert_eq!(client.restore_session(), RestoreOutcome::NothingToRestore);
        let notice = &client.notifications().active()[0];
        assert_eq!(notice.kind, NotificationKind::Info);
        assert_eq!(notice.message, "No previous session found");
    }

    #[tokio::test]
    async fn test_clear_history_empties_memory_and_storage() {
        let store = Arc::new(MemoryStore::new());
        seed(&store, &["a"]);
        let client =
            RouterClient::with_parts(Arc::new(FakeBackend::new()), store.clone(), &memory_config());

        client.clear_history();

        assert!(client.session().is_empty());
        assert_eq!(client.session().history_len(), 0);
        assert!(SessionStore::open(store).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_session_cancels_and_refetches_metrics() {
        let backend = Arc::new(FakeBackend::new());
        backend.script("slow", Scripted::ok("late", Duration::from_secs(10)));
        backend.set_metrics(Ok(sample_metrics(5)));
        let client = Arc::new(RouterClient::with_parts(
            backend.clone(),
            Arc::new(MemoryStore::new()),
            &memory_config(),
        ));
        client.submit("first", None, None).await.unwrap();
        client.controller().set_draft("draft text");

        let pending = {
            let client = client.clone();
            tokio::spawn(async move { client.submit("slow", None, None).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        client.reset_session().await;

        assert_eq!(pending.await.unwrap().unwrap(), SubmitOutcome::Discarded);
        assert!(client.session().is_empty());
        assert!(client.controller().draft().is_empty());
        assert!(!client.is_loading());
        assert_eq!(client.metrics().summary().unwrap().total_requests, 5);
        // One refresh after "first", one from the reset
        assert_eq!(backend.metrics_calls(), 2);
    }

    #[tokio::test]
    async fn test_recall_copies_history_query_into_draft() {
        let client = RouterClient::with_parts(
            Arc::new(FakeBackend::new()),
            Arc::new(MemoryStore::new()),
            &memory_config(),
        );
        client.submit("older", None, None).await.unwrap();
        client.submit("newer", None, None).await.unwrap();

        assert_eq!(client.recall(1).as_deref(), Some("older"));
        assert_eq!(client.controller().draft(), "older");
        assert!(client.recall(5).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_polls_health_and_metrics_then_shutdown_stops() {
        let backend = Arc::new(FakeBackend::new());
        let client = RouterClient::with_parts(
            backend.clone(),
            Arc::new(MemoryStore::new()),
            &memory_config(),
        );

        client.start().await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(backend.metrics_calls(), 1);
        assert_eq!(backend.health_calls(), 1);
        assert!(client.health().is_running());

        client.shutdown();
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(backend.health_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_skips_health_when_disabled() {
        let backend = Arc::new(FakeBackend::new());
        let mut config = memory_config();
        config.health_check.enabled = false;
        let client = RouterClient::with_parts(backend.clone(), Arc::new(MemoryStore::new()), &config);

        client.start().await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(backend.health_calls(), 0);
        assert!(!client.health().is_running());
    }
}
