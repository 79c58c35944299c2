//! Collaborators of the explorer core
//!
//! The core never talks to the network directly. It is handed
//! implementations of these traits:
//! - [`KnowledgeApi`] - folder listings for the internal root and providers
//! - [`AssociationApi`] - linking a knowledge item to a brain
//! - [`BrainDirectory`] / [`ProviderDirectory`] - brains and connected providers
//! - [`Navigator`] - navigation of the outer application
//!
//! [`QuivrClient`] implements the remote traits over HTTP and
//! [`MemoryBackend`] implements them in memory.

mod client;
mod memory;
mod navigation;

pub use client::QuivrClient;
pub use memory::MemoryBackend;
pub use navigation::{BrowserNavigator, RecordingNavigator};

use crate::knowledge::{Brain, KMSElement, ProviderRef};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Folder listings
#[async_trait]
pub trait KnowledgeApi: Send + Sync {
    /// List a folder of the internal root; `None` lists the root itself
    async fn list_folder(&self, folder_id: Option<&str>) -> Result<Vec<KMSElement>>;

    /// List a folder of an external provider; `None` lists its top level
    async fn list_provider_folder(
        &self,
        provider: &ProviderRef,
        folder_id: Option<&str>,
    ) -> Result<Vec<KMSElement>>;
}

/// Association writes
#[async_trait]
pub trait AssociationApi: Send + Sync {
    /// Persist a link between a knowledge item and a brain
    async fn link_item_to_brain(&self, item_id: &str, brain_id: &str) -> Result<()>;
}

#[async_trait]
pub trait BrainDirectory: Send + Sync {
    async fn list_brains(&self) -> Result<Vec<Brain>>;
}

#[async_trait]
pub trait ProviderDirectory: Send + Sync {
    async fn list_providers(&self) -> Result<Vec<ProviderRef>>;
}

/// Navigation of the outer application. No result is consumed.
pub trait Navigator: Send + Sync {
    fn go_to(&self, path: &str);
}

/// The full set of collaborators handed to the terminal UI
#[derive(Clone)]
pub struct Services {
    pub knowledge: Arc<dyn KnowledgeApi>,
    pub associations: Arc<dyn AssociationApi>,
    pub brains: Arc<dyn BrainDirectory>,
    pub providers: Arc<dyn ProviderDirectory>,
    pub navigator: Arc<dyn Navigator>,
}

impl Services {
    /// Use one backend for every remote collaborator
    pub fn from_backend<B>(backend: Arc<B>, navigator: Arc<dyn Navigator>) -> Self
    where
        B: KnowledgeApi + AssociationApi + BrainDirectory + ProviderDirectory + 'static,
    {
        Self {
            knowledge: backend.clone(),
            associations: backend.clone(),
            brains: backend.clone(),
            providers: backend,
            navigator,
        }
    }
}
