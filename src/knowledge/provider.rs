//! External storage providers connected to the user's account

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of external provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Google,
    Azure,
    Dropbox,
    #[serde(rename = "github")]
    GitHub,
    Notion,
    #[serde(other)]
    Other,
}

impl ProviderKind {
    /// Parse from the upstream provider name (case-insensitive)
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "google" | "google drive" => Self::Google,
            "azure" | "onedrive" | "sharepoint" => Self::Azure,
            "dropbox" => Self::Dropbox,
            "github" => Self::GitHub,
            "notion" => Self::Notion,
            _ => Self::Other,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Google => "Google Drive",
            Self::Azure => "OneDrive",
            Self::Dropbox => "Dropbox",
            Self::GitHub => "GitHub",
            Self::Notion => "Notion",
            Self::Other => "Provider",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Reference to a connected provider account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRef {
    /// Sync id of the connection
    pub id: String,

    /// Connection name chosen by the user
    pub name: String,

    pub kind: ProviderKind,

    /// Account email, when the provider exposes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ProviderRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ProviderKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
