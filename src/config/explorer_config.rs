//! Explorer configuration file handling
//!
//! Loads and manages ~/.config/kms-explorer/config.yaml.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Knowledge API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the knowledge API
    #[serde(default = "default_api_host")]
    pub host: String,

    /// Environment variable holding the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_api_host() -> String {
    "http://localhost:5050".to_string()
}

fn default_token_env() -> String {
    "QUIVR_API_TOKEN".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            token_env: default_token_env(),
        }
    }
}

/// Navigation settings for brain links
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Web frontend base URL
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,

    /// Path prefix of a brain's studio page
    #[serde(default = "default_studio_path")]
    pub studio_path: String,

    /// Open navigation targets in the system browser
    #[serde(default)]
    pub open_in_browser: bool,
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_studio_path() -> String {
    "/studio".to_string()
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            frontend_url: default_frontend_url(),
            studio_path: default_studio_path(),
            open_in_browser: false,
        }
    }
}

/// Terminal UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Event poll interval in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval() -> u64 {
    100
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
        }
    }
}

/// Explorer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub navigation: NavigationConfig,

    #[serde(default)]
    pub ui: UiConfig,

    /// Log file used while the terminal UI is running
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn config_dir() -> PathBuf {
    // Always use ~/.config for consistency across platforms (macOS, Linux)
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".config");
    path.push("kms-explorer");
    path
}

fn default_log_file() -> PathBuf {
    config_dir().join("explorer.log")
}

impl ExplorerConfig {
    pub fn new() -> Self {
        Self {
            api: ApiConfig::default(),
            navigation: NavigationConfig::default(),
            ui: UiConfig::default(),
            log_file: default_log_file(),
        }
    }

    /// Load from the default path, falling back to defaults when the file
    /// does not exist
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::new());
        }
        Self::load(&path)
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::ExplorerError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading explorer configuration");

        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        tracing::debug!(host = %config.api.host, "Configuration loaded successfully");

        Ok(config)
    }

    pub fn save_default(&self) -> Result<()> {
        self.save(Self::default_path())
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %path.display(), "Saving explorer configuration");

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    /// Default config path (~/.config/kms-explorer/config.yaml)
    pub fn default_path() -> PathBuf {
        config_dir().join("config.yaml")
    }

    /// Application path of a brain's studio page
    pub fn studio_route(&self, brain_route_id: &str) -> String {
        format!("{}/{}", self.navigation.studio_path.trim_end_matches('/'), brain_route_id)
    }
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self::new()
    }
}
