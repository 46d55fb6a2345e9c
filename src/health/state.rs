//! Last-known backend health and the connection state derived from it.

use crate::api::{ApiError, HealthStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What the presentation layer should show for the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No poll has completed yet
    Connecting,
    /// Last poll succeeded
    Healthy,
    /// Polls are failing and the backend has never answered
    Unreachable,
    /// Polls are failing; a previously fetched status is still held
    Lost,
}

/// Tracks health poll results.
#[derive(Debug, Clone, Default)]
pub struct HealthSnapshot {
    /// Last successfully fetched status, kept across failures
    pub status: Option<HealthStatus>,
    /// Set by a failed poll, cleared by a successful one
    pub unreachable: bool,
    /// When the last poll completed
    pub last_check_time: Option<DateTime<Utc>>,
    /// Error from the most recent failed poll
    pub last_error: Option<String>,
    /// Count of consecutive failed polls
    pub consecutive_failures: u32,
}

impl HealthSnapshot {
    pub fn connection_state(&self) -> ConnectionState {
        match (self.unreachable, &self.status) {
            (false, Some(_)) => ConnectionState::Healthy,
            (false, None) => ConnectionState::Connecting,
            (true, Some(_)) => ConnectionState::Lost,
            (true, None) => ConnectionState::Unreachable,
        }
    }

    /// Apply a poll result. Returns `Some(new_state)` if the connection state changed.
    pub fn apply_result(
        &mut self,
        result: Result<HealthStatus, ApiError>,
    ) -> Option<ConnectionState> {
        let before = self.connection_state();

        match result {
            Ok(status) => {
                self.status = Some(status);
                self.unreachable = false;
                self.last_error = None;
                self.consecutive_failures = 0;
            }
            Err(e) => {
                self.unreachable = true;
                self.last_error = Some(e.to_string());
                self.consecutive_failures += 1;
            }
        }
        self.last_check_time = Some(Utc::now());

        let after = self.connection_state();
        (after != before).then_some(after)
    }
}
