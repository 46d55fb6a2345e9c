//! Configuration for backend health polling.

use serde::{Deserialize, Serialize};

/// Configuration for the health monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Whether health polling runs at all
    pub enabled: bool,
    /// Seconds between polls
    pub interval_seconds: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 30,
        }
    }
}
