//! HTTP client for the Quivr knowledge API

use super::{AssociationApi, BrainDirectory, KnowledgeApi, ProviderDirectory};
use crate::config::ExplorerConfig;
use crate::knowledge::{Brain, KMSElement, ProviderKind, ProviderRef};
use crate::{ExplorerError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Knowledge API client
#[derive(Debug, Clone)]
pub struct QuivrClient {
    host: String,
    token: String,
    client: reqwest::Client,
}

/// Response from /brains/
#[derive(Debug, Deserialize)]
struct BrainsResponse {
    brains: Vec<Brain>,
}

/// Connected provider from /sync/user
#[derive(Debug, Deserialize)]
struct UserSync {
    id: serde_json::Value,
    name: String,
    provider: String,
    #[serde(default)]
    email: Option<String>,
}

impl From<UserSync> for ProviderRef {
    fn from(sync: UserSync) -> Self {
        let id = match sync.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        ProviderRef {
            id,
            name: sync.name,
            kind: ProviderKind::from_name(&sync.provider),
            email: sync.email,
        }
    }
}

/// Link request for /knowledge/link_to_brains/
#[derive(Debug, Serialize)]
struct LinkRequest<'a> {
    knowledge_id: &'a str,
    brain_ids: [&'a str; 1],
}

/// Error body returned by the API
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    detail: String,
}

impl QuivrClient {
    /// Create with explicit host and token
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            host: host.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from config, reading the token from the configured
    /// environment variable
    pub fn from_config(config: &ExplorerConfig) -> Result<Self> {
        let token = std::env::var(&config.api.token_env).map_err(|_| {
            ExplorerError::Config(format!(
                "API token not set: export {} or run with --demo",
                config.api.token_env
            ))
        })?;
        Ok(Self::new(&config.api.host, token))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    async fn check(response: reqwest::Response, action: &str) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let error: ErrorResponse = response.json().await.unwrap_or(ErrorResponse {
            detail: "Unknown error".to_string(),
        });
        tracing::debug!(status = status.as_u16(), action, detail = %error.detail, "API request failed");

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ExplorerError::NotFound(format!("{}: {}", action, error.detail)));
        }
        Err(ExplorerError::Api {
            status: status.as_u16(),
            message: format!("Failed to {}: {}", action, error.detail),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str, action: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await?;

        let response = Self::check(response, action).await?;
        Ok(response.json().await?)
    }
}

/// Append an optional query parameter
fn with_param(url: String, name: &str, value: Option<&str>) -> String {
    match value {
        Some(v) => format!("{}?{}={}", url, name, urlencoding::encode(v)),
        None => url,
    }
}

#[async_trait]
impl KnowledgeApi for QuivrClient {
    async fn list_folder(&self, folder_id: Option<&str>) -> Result<Vec<KMSElement>> {
        let url = with_param(format!("{}/knowledge/files", self.host), "parent_id", folder_id);
        self.get_json(&url, "list files").await
    }

    async fn list_provider_folder(
        &self,
        provider: &ProviderRef,
        folder_id: Option<&str>,
    ) -> Result<Vec<KMSElement>> {
        let url = with_param(
            format!("{}/sync/{}/files", self.host, urlencoding::encode(&provider.id)),
            "folder_id",
            folder_id,
        );
        let mut items: Vec<KMSElement> = self.get_json(&url, "list provider files").await?;
        for item in &mut items {
            if item.source.is_none() {
                item.source = Some(provider.name.clone());
            }
        }
        Ok(items)
    }
}

#[async_trait]
impl AssociationApi for QuivrClient {
    async fn link_item_to_brain(&self, item_id: &str, brain_id: &str) -> Result<()> {
        let url = format!("{}/knowledge/link_to_brains/", self.host);
        let request = LinkRequest {
            knowledge_id: item_id,
            brain_ids: [brain_id],
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&request)
            .send()
            .await?;

        Self::check(response, "link knowledge to brain").await?;
        Ok(())
    }
}

#[async_trait]
impl BrainDirectory for QuivrClient {
    async fn list_brains(&self) -> Result<Vec<Brain>> {
        let url = format!("{}/brains/", self.host);
        let response: BrainsResponse = self.get_json(&url, "list brains").await?;
        Ok(response.brains)
    }
}

#[async_trait]
impl ProviderDirectory for QuivrClient {
    async fn list_providers(&self) -> Result<Vec<ProviderRef>> {
        let url = format!("{}/sync/user", self.host);
        let syncs: Vec<UserSync> = self.get_json(&url, "list providers").await?;
        Ok(syncs.into_iter().map(ProviderRef::from).collect())
    }
}
