//! Configuration system
//!
//! Loads ~/.config/kms-explorer/config.yaml with support for:
//! - Knowledge API host and token source
//! - Brain navigation targets in the web frontend
//! - Terminal UI preferences

mod explorer_config;
pub mod validation;

pub use explorer_config::{ApiConfig, ExplorerConfig, NavigationConfig, UiConfig};
pub use validation::{validate_config, validate_config_result, ValidationError};
