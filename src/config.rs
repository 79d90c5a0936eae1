//! Connector configuration
//!
//! Settings mirror the connector configuration map of the platform:
//! mandatory `path` (archive root) and `pattern` (identity regex), plus
//! an optional `daemon` endpoint handed to the execution engine client.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Connector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorSettings {
    /// Archive root directory
    #[serde(default)]
    pub path: PathBuf,

    /// Identity pattern with named capture groups `source` and `metric`,
    /// matched against paths relative to the archive root
    #[serde(default)]
    pub pattern: String,

    /// Optional computation daemon endpoint (e.g. `unix:/var/run/rrdcached.sock`)
    #[serde(default)]
    pub daemon: Option<String>,

    /// Buffer size of the discovery event channel
    #[serde(default = "default_discovery_buffer")]
    pub discovery_buffer: usize,
}

fn default_discovery_buffer() -> usize {
    256
}

impl ConnectorSettings {
    /// Create settings from the two mandatory values
    pub fn new(path: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            pattern: pattern.into(),
            daemon: None,
            discovery_buffer: default_discovery_buffer(),
        }
    }

    /// Set the computation daemon endpoint
    pub fn with_daemon(mut self, daemon: impl Into<String>) -> Self {
        self.daemon = Some(daemon.into());
        self
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingSetting("path"));
        }
        if self.pattern.is_empty() {
            return Err(ConfigError::MissingSetting("pattern"));
        }
        if self.discovery_buffer == 0 {
            return Err(ConfigError::InvalidSetting {
                setting: "discovery_buffer",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
