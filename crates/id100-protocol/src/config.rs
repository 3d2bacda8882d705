//! Driver configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for a [`Device`](crate::Device) session.
///
/// ```yaml
/// device: /dev/hidraw0
/// log_payloads: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    /// Context handed to [`Link::connect`](crate::Link::connect).
    pub device: String,
    /// Hex-dump request and reply payloads at trace level.
    #[serde(default)]
    pub log_payloads: bool,
}

impl DriverConfig {
    /// Create a configuration for a device.
    pub fn new(device: impl Into<String>) -> Self {
        DriverConfig {
            device: device.into(),
            log_payloads: false,
        }
    }

    /// Parse and validate a configuration from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: DriverConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Check field values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device.trim().is_empty() {
            return Err(ConfigError::Invalid("device must not be empty".to_string()));
        }
        Ok(())
    }
}
