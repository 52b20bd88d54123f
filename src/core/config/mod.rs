use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_NAME: &str = "queue";
pub const DEFAULT_CAPACITY: usize = 1024;

/// Settings for building a `BoundedBlockingQueue`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Label attached to log events and stats snapshots.
    pub name: String,
    /// Hard ceiling on queued elements. Fixed for the queue's lifetime.
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl QueueConfig {
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            capacity,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        Ok(())
    }

    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: QueueConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = QueueConfig::from_json_str(r#"{"capacity": 8}"#).unwrap();
        assert_eq!(config.name, DEFAULT_NAME);
        assert_eq!(config.capacity, 8);

        let config = QueueConfig::from_json_str("{}").unwrap();
        assert_eq!(config, QueueConfig::default());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = QueueConfig::from_json_str(r#"{"name": "jobs", "capacity": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroCapacity));
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = QueueConfig::new("  ", 4).validate().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyName));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = QueueConfig::from_json_str(r#"{"capacity": "many"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = QueueConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
