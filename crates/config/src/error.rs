//! Error types for the configuration engine

use std::collections::TryReserveError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write config file
    #[error("Failed to write config file at {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse the engine settings file
    #[error("Failed to parse settings file at {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Failed to serialize engine settings
    #[error("Failed to serialize settings: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// A definition (option, section, settings) contains invalid values
    #[error("Config validation failed: {0}")]
    ValidationError(String),

    /// Failed to create config directory
    #[error("Failed to create config directory at {path}: {source}")]
    DirectoryCreationError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to create backup of a config file
    #[error("Failed to backup config file {path}: {source}")]
    BackupError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Memory for a read buffer could not be reserved
    #[error("Not enough memory: {0}")]
    AllocationFailure(#[from] TryReserveError),

    /// A file, section or option addressed by name does not exist
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    /// A name is already used by a sibling
    #[error("{kind} already exists: {name}")]
    DuplicateName { kind: &'static str, name: String },

    /// The value was rejected by the type grammar or a check callback
    #[error("Invalid value for option {option}: {value}")]
    InvalidValue { option: String, value: String },

    /// The option is not registered and the section cannot create it
    #[error("Unknown option for section \"{section}\": {option}")]
    UnknownOption { section: String, option: String },

    /// The file was written by a newer build
    #[error("Version read in {path} ({found}) is newer than supported version ({supported})")]
    VersionTooNew {
        path: PathBuf,
        found: u32,
        supported: u32,
    },

    /// The `config_version` line does not hold a positive integer
    #[error("Invalid config version in {path}: \"{text}\"")]
    InvalidVersion { path: PathBuf, text: String },

    /// Generic I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        ConfigError::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn invalid_value(option: impl Into<String>, value: Option<&str>) -> Self {
        ConfigError::InvalidValue {
            option: option.into(),
            value: value.unwrap_or(crate::NULL_VALUE).to_string(),
        }
    }
}

/// Validation error for a specific definition field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Path to the field (e.g., "weechat.look.mode")
    pub field: String,

    /// Human-readable error message
    pub message: String,

    /// The invalid value, if available
    pub value: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    /// Creates a validation error with the invalid value
    pub fn with_value(
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: Some(value.to_string()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Field '{}': {}", self.field, self.message)?;
        if let Some(ref value) = self.value {
            write!(f, " (got: {})", value)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl From<Vec<ValidationError>> for ConfigError {
    fn from(errors: Vec<ValidationError>) -> Self {
        let message = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        ConfigError::ValidationError(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("test.look.mode", "must not be empty");
        assert_eq!(err.to_string(), "Field 'test.look.mode': must not be empty");
    }

    #[test]
    fn test_validation_error_with_value() {
        let err = ValidationError::with_value("test.look.width", "must be between 0 and 10", "15");
        assert_eq!(
            err.to_string(),
            "Field 'test.look.width': must be between 0 and 10 (got: 15)"
        );
    }

    #[test]
    fn test_validation_errors_join_into_config_error() {
        let err: ConfigError = vec![
            ValidationError::new("a", "first"),
            ValidationError::new("b", "second"),
        ]
        .into();
        assert_eq!(
            err.to_string(),
            "Config validation failed: Field 'a': first; Field 'b': second"
        );
    }

    #[test]
    fn test_invalid_value_null_display() {
        let err = ConfigError::invalid_value("test.look.width", None);
        assert_eq!(err.to_string(), "Invalid value for option test.look.width: null");
    }
}
