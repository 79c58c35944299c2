//! Knowledge items and folder references

use super::status::{classify, KnowledgeStatus, StatusClass};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a knowledge item was imported from
pub const LOCAL_SOURCE: &str = "local";

/// A knowledge item (file, document or folder) returned by the listing API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMSElement {
    /// Unique identifier
    pub id: String,

    /// Display name
    pub file_name: String,

    #[serde(default)]
    pub is_folder: bool,

    /// Containing folder; `None` at a root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Sync status; `None` means not applicable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<KnowledgeStatus>,

    /// `local` or the provider name the item was synced from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<DateTime<Utc>>,

    /// Ids of the brains this item is linked to
    #[serde(default)]
    pub brains: Vec<String>,
}

impl KMSElement {
    /// A file item with no status and no links
    pub fn file(id: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            is_folder: false,
            parent_id: None,
            status: None,
            source: None,
            url: None,
            extension: None,
            last_modified_at: None,
            brains: Vec::new(),
        }
    }

    pub fn folder(id: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            is_folder: true,
            ..Self::file(id, file_name)
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_status(mut self, status: KnowledgeStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_brains<I, S>(mut self, brains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.brains = brains.into_iter().map(Into::into).collect();
        self
    }

    pub fn status_class(&self) -> StatusClass {
        classify(self.status.as_ref())
    }

    pub fn is_linked_to(&self, brain_id: &str) -> bool {
        self.brains.iter().any(|b| b == brain_id)
    }

    /// Add a confirmed link. Returns false if it was already present.
    pub fn add_brain(&mut self, brain_id: &str) -> bool {
        if self.is_linked_to(brain_id) {
            return false;
        }
        self.brains.push(brain_id.to_string());
        true
    }

    /// Whether this item lives in the internal root rather than a provider
    pub fn is_local(&self) -> bool {
        self.source.as_deref().map_or(true, |s| s == LOCAL_SOURCE)
    }

    /// Folder reference for a folder item
    pub fn as_folder_ref(&self) -> Option<FolderRef> {
        self.is_folder.then(|| FolderRef {
            id: self.id.clone(),
            name: self.file_name.clone(),
            parent_id: self.parent_id.clone(),
        })
    }
}

/// Reference to a displayed folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl FolderRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_ref_only_for_folders() {
        let file = KMSElement::file("f1", "notes.md");
        assert!(file.as_folder_ref().is_none());

        let folder = KMSElement::folder("d1", "Reports").with_parent("root-child");
        let folder_ref = folder.as_folder_ref().unwrap();
        assert_eq!(folder_ref.id, "d1");
        assert_eq!(folder_ref.parent_id.as_deref(), Some("root-child"));
    }

    #[test]
    fn test_add_brain_is_idempotent() {
        let mut item = KMSElement::file("f1", "notes.md").with_brains(["b1"]);
        assert!(!item.add_brain("b1"));
        assert!(item.add_brain("b2"));
        assert_eq!(item.brains, vec!["b1", "b2"]);
    }

    #[test]
    fn test_is_local() {
        assert!(KMSElement::file("a", "a").is_local());
        assert!(KMSElement::file("a", "a").with_source("local").is_local());
        assert!(!KMSElement::file("a", "a").with_source("google").is_local());
    }

    #[test]
    fn test_deserialize_upstream_payload() {
        let json = r#"{
            "id": "k-1",
            "file_name": "paper.pdf",
            "is_folder": false,
            "status": "PROCESSING",
            "source": "local",
            "brains": ["b-1", "b-2"]
        }"#;
        let item: KMSElement = serde_json::from_str(json).unwrap();
        assert_eq!(item.status_class(), StatusClass::Waiting);
        assert_eq!(item.brains.len(), 2);
        assert!(item.parent_id.is_none());
    }
}
