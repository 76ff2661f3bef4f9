//! Error types for the timegrid calendar core.

use thiserror::Error;

/// Main error type for timegrid operations.
#[derive(Error, Debug)]
pub enum TimegridError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Errors produced while fetching events from a remote source.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Authentication required: {0}")]
    AuthRequired(String),

    #[error("Endpoint not found: {0}")]
    NotFound(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl FetchError {
    /// Whether this error halts automatic fetch cycles until a manual
    /// refresh clears the condition.
    pub fn is_halting(&self) -> bool {
        matches!(self, FetchError::AuthRequired(_) | FetchError::NotFound(_))
    }
}

/// Result type alias for timegrid operations.
pub type Result<T> = std::result::Result<T, TimegridError>;
