//! Configuration validation
//!
//! Validates explorer configuration for correctness:
//! - API host and frontend URL are http(s) URLs
//! - Token environment variable name is not empty
//! - Studio path is absolute
//! - Poll interval is positive

use super::explorer_config::ExplorerConfig;
use crate::ExplorerError;

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty())
}

/// Validate an explorer configuration
pub fn validate_config(config: &ExplorerConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if !is_http_url(&config.api.host) {
        errors.push(ValidationError::new(
            "api.host",
            format!("Invalid API URL: {}", config.api.host),
        ));
    }

    if config.api.token_env.trim().is_empty() {
        errors.push(ValidationError::new(
            "api.token_env",
            "Token environment variable name cannot be empty",
        ));
    }

    if !is_http_url(&config.navigation.frontend_url) {
        errors.push(ValidationError::new(
            "navigation.frontend_url",
            format!("Invalid frontend URL: {}", config.navigation.frontend_url),
        ));
    }

    if !config.navigation.studio_path.starts_with('/') {
        errors.push(ValidationError::new(
            "navigation.studio_path",
            "Studio path must start with '/'",
        ));
    }

    if config.ui.poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "ui.poll_interval_ms",
            "Poll interval must be greater than 0",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate configuration and return a Result
pub fn validate_config_result(config: &ExplorerConfig) -> crate::Result<()> {
    validate_config(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        ExplorerError::Config(format!(
            "Configuration validation failed:\n  - {}",
            messages.join("\n  - ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExplorerConfig::new();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_urls() {
        let mut config = ExplorerConfig::new();
        config.api.host = "localhost:5050".to_string();
        config.navigation.frontend_url = "https://".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "api.host");
        assert_eq!(errors[1].field, "navigation.frontend_url");
    }

    #[test]
    fn test_relative_studio_path() {
        let mut config = ExplorerConfig::new();
        config.navigation.studio_path = "studio".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].message.contains("must start with"));
    }

    #[test]
    fn test_validate_config_result_joins_messages() {
        let mut config = ExplorerConfig::new();
        config.ui.poll_interval_ms = 0;
        config.api.token_env = " ".to_string();

        let err = validate_config_result(&config).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("api.token_env"));
        assert!(message.contains("ui.poll_interval_ms"));
    }
}
