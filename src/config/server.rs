//! Router backend connection settings

use serde::{Deserialize, Serialize};

/// Where the router backend lives and how long polls may take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Backend base URL, e.g. `http://localhost:8000`
    pub base_url: String,
    /// Deadline for health and metrics polls. Route submissions have none.
    pub poll_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            poll_timeout_seconds: 5,
        }
    }
}
