//! Durable session state: the response transcript and the bounded query history.
//!
//! Both lists live in memory and are written through to a [`KeyValueStore`] on every
//! mutation. Persistence failures are logged and swallowed; the in-memory session stays
//! authoritative for the lifetime of the process.

mod storage;

pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};

use crate::api::RouteResponse;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Maximum number of history entries kept (most recent first).
pub const HISTORY_LIMIT: usize = 20;

/// Record key for the response transcript.
pub const RESPONSES_KEY: &str = "slr_responses";

/// Record key for the query history.
pub const HISTORY_KEY: &str = "slr_history";

/// One answered query in the transcript, in submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEntry {
    pub query: String,
    pub response: RouteResponse,
    /// Serialized as RFC 3339
    pub timestamp: DateTime<Utc>,
}

/// One entry of the recent-query history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub query: String,
    pub response: RouteResponse,
}

impl From<&ResponseEntry> for HistoryEntry {
    fn from(entry: &ResponseEntry) -> Self {
        Self {
            query: entry.query.clone(),
            response: entry.response.clone(),
        }
    }
}

/// Result of [`SessionStore::restore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The persisted transcript is empty, missing or unreadable.
    NothingToRestore,
    Restored { responses: usize, history: usize },
}

#[derive(Debug, Default)]
struct SessionState {
    responses: Vec<ResponseEntry>,
    history: Vec<HistoryEntry>,
}

/// In-memory session mirrored to a persistence provider.
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    state: RwLock<SessionState>,
}

impl SessionStore {
    /// Create a store with an empty in-memory session; persisted records are left alone.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Create a store and load the persisted session into memory.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let session = Self::new(store);
        let responses = session.load_responses();
        let history = session.load_history();
        tracing::debug!(
            responses = responses.len(),
            history = history.len(),
            "Loaded persisted session"
        );
        *session.write() = SessionState { responses, history };
        session
    }

    /// Read the persisted transcript. Never fails: unreadable data yields an empty list.
    pub fn load_responses(&self) -> Vec<ResponseEntry> {
        self.read_record(RESPONSES_KEY)
    }

    /// Read the persisted history, capped at [`HISTORY_LIMIT`].
    pub fn load_history(&self) -> Vec<HistoryEntry> {
        let mut history: Vec<HistoryEntry> = self.read_record(HISTORY_KEY);
        history.truncate(HISTORY_LIMIT);
        history
    }

    /// Append to the end of the transcript and persist it.
    pub fn append_response(&self, entry: ResponseEntry) {
        let mut state = self.write();
        state.responses.push(entry);
        self.persist(RESPONSES_KEY, &state.responses);
    }

    /// Prepend to the history, evict beyond [`HISTORY_LIMIT`], and persist it.
    pub fn append_history(&self, entry: HistoryEntry) {
        let mut state = self.write();
        state.history.insert(0, entry);
        state.history.truncate(HISTORY_LIMIT);
        self.persist(HISTORY_KEY, &state.history);
    }

    /// Empty both lists in memory and in the persisted records.
    pub fn clear(&self) {
        let mut state = self.write();
        state.responses.clear();
        state.history.clear();
        self.persist(RESPONSES_KEY, &state.responses);
        self.persist(HISTORY_KEY, &state.history);
        tracing::info!("Session cleared");
    }

    /// Replace the in-memory session with the persisted one, if there is any.
    pub fn restore(&self) -> RestoreOutcome {
        let responses = self.load_responses();
        if responses.is_empty() {
            return RestoreOutcome::NothingToRestore;
        }

        let history = self.load_history();
        let outcome = RestoreOutcome::Restored {
            responses: responses.len(),
            history: history.len(),
        };
        *self.write() = SessionState { responses, history };

        tracing::info!(?outcome, "Session restored");
        outcome
    }

    /// True when memory is empty but a non-empty transcript is persisted.
    pub fn has_stored_session(&self) -> bool {
        self.is_empty() && !self.load_responses().is_empty()
    }

    /// Transcript in chronological order.
    pub fn responses(&self) -> Vec<ResponseEntry> {
        self.read().responses.clone()
    }

    /// History, most recent first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.read().history.clone()
    }

    pub fn response_count(&self) -> usize {
        self.read().responses.len()
    }

    pub fn history_len(&self) -> usize {
        self.read().history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().responses.is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_record<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.store.get(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(key, error = %e, "Discarding unreadable session record");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(key, error = %e, "Session storage read failed");
                Vec::new()
            }
        }
    }

    /// Write a record; failures only cost durability.
    fn persist<T: Serialize>(&self, key: &str, items: &[T]) {
        let result = serde_json::to_string(items)
            .map_err(|e| StorageError::Unavailable(e.to_string()))
            .and_then(|raw| self.store.set(key, &raw));

        if let Err(e) = result {
            tracing::warn!(key, error = %e, "Session storage write failed, continuing in memory");
        }
    }
}
