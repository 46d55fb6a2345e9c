//! Session persistence settings

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which persistence provider backs the session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// JSON records under `state_dir`
    #[default]
    File,
    /// Nothing survives the process
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub storage: StorageKind,
    /// Directory holding the persisted records (file storage only)
    pub state_dir: PathBuf,
    /// Load the persisted session into memory at startup
    pub restore_on_start: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage: StorageKind::File,
            state_dir: PathBuf::from(".router-client"),
            restore_on_start: true,
        }
    }
}

/// Notification settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Time-to-live of each notification in milliseconds
    pub ttl_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { ttl_ms: 5000 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.storage, StorageKind::File);
        assert_eq!(config.state_dir, PathBuf::from(".router-client"));
        assert!(config.restore_on_start);
        assert_eq!(NotificationConfig::default().ttl_ms, 5000);
    }

    #[test]
    fn test_storage_kind_parsing() {
        let config: SessionConfig = toml::from_str(r#"storage = "memory""#).unwrap();
        assert_eq!(config.storage, StorageKind::Memory);
        assert!(config.restore_on_start);
    }
}
