//! `[logging]` table
//!
//! Log lines share the terminal with the chat prompt, so they always go to stderr
//! and the default level is `warn`. Individual modules can be turned up without
//! flooding the session:
//!
//! ```toml
//! [logging]
//! level = "warn"
//! format = "pretty"
//!
//! [logging.component_levels]
//! controller = "debug"
//! ```

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Levels accepted for `level` and for each component override.
pub const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Modules that can be given their own level under `[logging.component_levels]`.
pub const COMPONENTS: &[&str] = &[
    "cli",
    "client",
    "controller",
    "health",
    "metrics",
    "notify",
    "session",
];

/// Stderr line format, also settable through `ROUTER_CLIENT_LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Compact single-line output
    #[default]
    Pretty,
    /// One JSON object per line, for piping into a collector
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!(
                "unknown log format '{}' (expected 'pretty' or 'json')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// Per-module levels keyed by entries of [`COMPONENTS`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_levels: Option<HashMap<String, String>>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
            component_levels: None,
        }
    }
}

impl LoggingConfig {
    /// Reject unknown levels and component names before the subscriber is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_level(&self.level) {
            return Err(ConfigError::validation(
                "logging.level",
                format!("'{}' is not one of {}", self.level, LEVELS.join(", ")),
            ));
        }

        let Some(levels) = &self.component_levels else {
            return Ok(());
        };
        let mut entries: Vec<_> = levels.iter().collect();
        entries.sort();
        for (component, level) in entries {
            let field = format!("logging.component_levels.{}", component);
            if !COMPONENTS.contains(&component.as_str()) {
                return Err(ConfigError::validation(
                    field,
                    format!("unknown component, expected one of {}", COMPONENTS.join(", ")),
                ));
            }
            if !is_level(level) {
                return Err(ConfigError::validation(
                    field,
                    format!("'{}' is not one of {}", level, LEVELS.join(", ")),
                ));
            }
        }
        Ok(())
    }
}

fn is_level(level: &str) -> bool {
    LEVELS.contains(&level.trim().to_ascii_lowercase().as_str())
}
