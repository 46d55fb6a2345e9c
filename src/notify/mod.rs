//! Ephemeral user-facing notifications.
//!
//! The `NotificationCenter` is an explicit service object handed to whoever needs to
//! raise a message. Every notification expires after a fixed time-to-live unless it is
//! dismissed first; the presentation layer either polls [`NotificationCenter::active`]
//! or subscribes to the [`NotificationEvent`] stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;

/// Default time-to-live for a notification.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(5);

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Process-wide id counter; ids never repeat even across centers.
static NEXT_NOTIFICATION_ID: AtomicU64 = AtomicU64::new(1);

/// Unique, monotonically assigned notification identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(u64);

impl NotificationId {
    fn next() -> Self {
        Self(NEXT_NOTIFICATION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Error,
    Success,
    Info,
}

/// A live notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
}

/// Why a notification left the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    Manual,
    Expired,
}

/// Change feed for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    Pushed(Notification),
    Dismissed {
        id: NotificationId,
        reason: DismissReason,
    },
}

/// Queue of auto-expiring notifications.
///
/// Cloning is cheap and every clone shares the same queue.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

struct Inner {
    ttl: Duration,
    /// Live notifications in insertion order
    live: RwLock<Vec<Notification>>,
    events: broadcast::Sender<NotificationEvent>,
}

impl Inner {
    fn remove(&self, id: NotificationId, reason: DismissReason) -> bool {
        let removed = {
            let mut live = self.live.write().unwrap_or_else(PoisonError::into_inner);
            let before = live.len();
            live.retain(|n| n.id != id);
            live.len() < before
        };

        if removed {
            tracing::debug!(id = %id, ?reason, "Notification dismissed");
            // Ignore error if no receivers are listening
            let _ = self
                .events
                .send(NotificationEvent::Dismissed { id, reason });
        }
        removed
    }
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                ttl,
                live: RwLock::new(Vec::new()),
                events,
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Enqueue a notification and schedule its automatic dismissal.
    ///
    /// Auto-expiry needs a tokio runtime; outside one the notification stays until
    /// dismissed manually.
    pub fn push(&self, message: impl Into<String>, kind: NotificationKind) -> NotificationId {
        let notification = Notification {
            id: NotificationId::next(),
            message: message.into(),
            kind,
            created_at: Utc::now(),
        };
        let id = notification.id;

        tracing::debug!(id = %id, ?kind, message = %notification.message, "Notification pushed");

        self.inner
            .live
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());
        let _ = self.inner.events.send(NotificationEvent::Pushed(notification));

        self.schedule_expiry(id);
        id
    }

    pub fn error(&self, message: impl Into<String>) -> NotificationId {
        self.push(message, NotificationKind::Error)
    }

    pub fn success(&self, message: impl Into<String>) -> NotificationId {
        self.push(message, NotificationKind::Success)
    }

    pub fn info(&self, message: impl Into<String>) -> NotificationId {
        self.push(message, NotificationKind::Info)
    }

    /// Remove a notification now. Returns false if it was already gone.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        self.inner.remove(id, DismissReason::Manual)
    }

    /// Live notifications in display (insertion) order.
    pub fn active(&self) -> Vec<Notification> {
        self.inner
            .live
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner
            .live
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.inner.events.subscribe()
    }

    fn schedule_expiry(&self, id: NotificationId) {
        let inner = Arc::downgrade(&self.inner);
        let ttl = self.inner.ttl;

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(ttl).await;
                    if let Some(inner) = inner.upgrade() {
                        inner.remove(id, DismissReason::Expired);
                    }
                });
            }
            Err(_) => {
                tracing::warn!(id = %id, "No async runtime, notification will not auto-expire");
            }
        }
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TTL)
    }
}
