// src/error.rs
//! Error types for the configuration boundary
//!
//! The waveform engine itself never fails at runtime: every setter and sampler works on
//! trusted values. Errors only arise while loading and validating a [`SystemConfig`].
//!
//! [`SystemConfig`]: crate::config::SystemConfig

use thiserror::Error;

/// A single configuration field or constraint that failed validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of its valid range
    #[error("field '{field}' value '{value}' is out of range [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: String,
        min: String,
        max: String,
    },

    /// Cross-field validation failure
    #[error("constraint violated between {fields:?}: {message}")]
    ConstraintViolation { fields: Vec<String>, message: String },
}

impl ValidationError {
    /// Build an [`ValidationError::OutOfRange`] from numeric bounds
    pub fn out_of_range(field: &str, value: f64, min: f64, max: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.to_string(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration parse error: {0}")]
    Parse(String),

    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("configuration validation failed: {}", format_validation(.0))]
    Validation(Vec<ValidationError>),
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
