//! Error types for DocSage

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the DocSage system
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Short classification used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::Retrieval(_) => "retrieval",
            Error::Generation(_) => "generation",
            Error::Configuration(_) => "configuration",
            Error::Authentication(_) => "authentication",
            Error::Network(_) => "network",
            Error::Serialization(_) => "serialization",
            Error::Timeout(_) => "timeout",
            Error::Io(_) => "io",
            Error::Other(_) => "other",
        }
    }

    /// Generic message safe to show to an end user.
    ///
    /// Validation errors carry their own message since the caller can fix the input;
    /// everything else collapses to a single failure message.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(msg) => msg.clone(),
            Error::Timeout(_) => "Request timed out. Please try again.".to_string(),
            _ => "Failed to generate response".to_string(),
        }
    }

    /// Whether a backend call that failed with this error is worth repeating.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Timeout(_))
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
