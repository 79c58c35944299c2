//! Error types for the knowledge explorer
//!
//! Defines the error enum shared by the API collaborators, configuration
//! loading and the CLI. The explorer core itself never fails: fetch and link
//! failures are reported through outcomes and logged.

use thiserror::Error;

/// Result type alias for explorer operations
pub type Result<T> = std::result::Result<T, ExplorerError>;

/// Error type for explorer operations
#[derive(Error, Debug)]
pub enum ExplorerError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network/transport errors
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success response from the knowledge API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Knowledge item, folder, brain or provider not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),

    /// Anyhow errors (for more context)
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

impl ExplorerError {
    /// Whether the failure came from the transport or the server rather than
    /// from local configuration
    pub fn is_remote(&self) -> bool {
        match self {
            ExplorerError::Network(_) | ExplorerError::Api { .. } | ExplorerError::Http(_) => true,
            ExplorerError::NotFound(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ExplorerError::Api {
            status: 503,
            message: "upstream unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "API error (503): upstream unavailable");
    }

    #[test]
    fn test_is_remote() {
        assert!(ExplorerError::Network("reset".into()).is_remote());
        assert!(ExplorerError::NotFound("folder-1".into()).is_remote());
        assert!(!ExplorerError::Config("bad host".into()).is_remote());
        assert!(!ExplorerError::Other("x".into()).is_remote());
    }
}
