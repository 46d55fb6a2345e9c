//! Configuration module for the router client
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`ROUTER_CLIENT_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use router_client::config::ClientConfig;
//!
//! let config = ClientConfig::default();
//! assert_eq!(config.server.base_url, "http://localhost:8000");
//!
//! let toml = r#"
//! [server]
//! base_url = "http://router.internal:9000"
//! "#;
//! let config: ClientConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.server.base_url, "http://router.internal:9000");
//! assert_eq!(config.health_check.interval_seconds, 30);
//! ```

pub mod error;
pub mod logging;
pub mod server;
pub mod session;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use server::ServerConfig;
pub use session::{NotificationConfig, SessionConfig, StorageKind};

// Re-export HealthCheckConfig from health module
pub use crate::health::HealthCheckConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Unified configuration for the router client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Router backend location
    pub server: ServerConfig,
    /// Health polling
    pub health_check: HealthCheckConfig,
    /// Notification time-to-live
    pub notifications: NotificationConfig,
    /// Session persistence
    pub session: SessionConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ClientConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p).map_err(|source| ConfigError::Read {
                    path: p.to_path_buf(),
                    source,
                })?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse {
                    path: p.to_path_buf(),
                    message: e.to_string(),
                })
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are silently ignored (the current value is kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("ROUTER_CLIENT_BASE_URL") {
            if !url.trim().is_empty() {
                self.server.base_url = url;
            }
        }

        if let Ok(level) = std::env::var("ROUTER_CLIENT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("ROUTER_CLIENT_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(health) = std::env::var("ROUTER_CLIENT_HEALTH_CHECK") {
            match health.to_lowercase().as_str() {
                "true" | "1" => self.health_check.enabled = true,
                "false" | "0" => self.health_check.enabled = false,
                _ => {}
            }
        }

        if let Ok(dir) = std::env::var("ROUTER_CLIENT_STATE_DIR") {
            if !dir.trim().is_empty() {
                self.session.state_dir = PathBuf::from(dir);
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.server.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::validation(
                "server.base_url",
                "URL cannot be empty",
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::validation(
                "server.base_url",
                format!("'{}' must start with http:// or https://", url),
            ));
        }

        if self.server.poll_timeout_seconds == 0 {
            return Err(ConfigError::validation(
                "server.poll_timeout_seconds",
                "timeout must be non-zero",
            ));
        }

        if self.health_check.interval_seconds == 0 {
            return Err(ConfigError::validation(
                "health_check.interval_seconds",
                "interval must be non-zero",
            ));
        }

        if self.notifications.ttl_ms == 0 {
            return Err(ConfigError::validation(
                "notifications.ttl_ms",
                "time-to-live must be non-zero",
            ));
        }

        self.logging.validate()
    }
}
