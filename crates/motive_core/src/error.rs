//! Core error types

use thiserror::Error;

/// Errors raised by the core runtime
#[derive(Error, Debug)]
pub enum MotionError {
    /// Configuration file could not be read
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be parsed
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration parsed but holds an unusable value
    #[error("Invalid config value for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// A numeric value was required but a non-numeric one was supplied
    #[error("Expected a numeric value, found {0:?}")]
    NotNumeric(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, MotionError>;
