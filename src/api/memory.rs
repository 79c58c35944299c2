//! In-memory knowledge backend
//!
//! Serves listings, brains and providers from memory. Used by `--demo` mode
//! and by tests, with switches to make listings or links fail.

use super::{AssociationApi, BrainDirectory, KnowledgeApi, ProviderDirectory};
use crate::knowledge::{Brain, KMSElement, KnowledgeStatus, ProviderKind, ProviderRef};
use crate::{ExplorerError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    items: Vec<KMSElement>,
    provider_items: HashMap<String, Vec<KMSElement>>,
    brains: Vec<Brain>,
    providers: Vec<ProviderRef>,
    fail_listings: bool,
    failing_brains: HashSet<String>,
    list_calls: usize,
    link_calls: usize,
}

/// Knowledge backend held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| ExplorerError::Other("memory backend lock poisoned".to_string()))
    }

    /// Add an item of the internal root
    pub fn with_item(self, item: KMSElement) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.items.push(item);
        }
        self
    }

    pub fn with_brain(self, brain: Brain) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.brains.push(brain);
        }
        self
    }

    /// Add a connected provider and its items
    pub fn with_provider(self, provider: ProviderRef, items: Vec<KMSElement>) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.provider_items.insert(provider.id.clone(), items);
            state.providers.push(provider);
        }
        self
    }

    /// Make every listing fail until switched back
    pub fn set_fail_listings(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_listings = fail;
        }
    }

    /// Make links to `brain_id` fail
    pub fn fail_links_to(&self, brain_id: impl Into<String>) {
        if let Ok(mut state) = self.state.lock() {
            state.failing_brains.insert(brain_id.into());
        }
    }

    pub fn set_status(&self, item_id: &str, status: Option<KnowledgeStatus>) {
        if let Ok(mut state) = self.state.lock() {
            if let Some(item) = state.items.iter_mut().find(|i| i.id == item_id) {
                item.status = status;
            }
        }
    }

    /// Current upstream copy of an item
    pub fn item(&self, item_id: &str) -> Option<KMSElement> {
        let state = self.state.lock().ok()?;
        state
            .items
            .iter()
            .chain(state.provider_items.values().flatten())
            .find(|i| i.id == item_id)
            .cloned()
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().map(|s| s.list_calls).unwrap_or(0)
    }

    pub fn link_calls(&self) -> usize {
        self.state.lock().map(|s| s.link_calls).unwrap_or(0)
    }

    /// Sample content for demo mode
    pub fn demo() -> Self {
        let research = Brain::new("brain-1", "Research").with_snippet("#c9e4ff", "🔬");
        let support = Brain::new("brain-2", "Support")
            .with_brain_id("support-studio")
            .with_snippet("#ffe1c9", "🎧");
        let legal = Brain::new("brain-3", "Legal").with_snippet("#e2f7d4", "⚖");

        let drive = ProviderRef::new("sync-google", "Team drive", ProviderKind::Google)
            .with_email("team@example.com");
        let notion = ProviderRef::new("sync-notion", "Wiki", ProviderKind::Notion);

        Self::new()
            .with_brain(research)
            .with_brain(support)
            .with_brain(legal)
            .with_item(KMSElement::folder("folder-reports", "Reports").with_source("local"))
            .with_item(
                KMSElement::file("k-paper", "attention-is-all-you-need.pdf")
                    .with_status(KnowledgeStatus::Uploaded)
                    .with_brains(["brain-1"]),
            )
            .with_item(
                KMSElement::file("k-faq", "support-faq.md")
                    .with_status(KnowledgeStatus::Processing)
                    .with_brains(["brain-2"]),
            )
            .with_item(
                KMSElement::file("k-contract", "contract-2024.docx")
                    .with_status(KnowledgeStatus::Error)
                    .with_brains(["brain-3"]),
            )
            .with_item(
                KMSElement::file("k-q1", "q1-summary.pdf")
                    .with_parent("folder-reports")
                    .with_status(KnowledgeStatus::Reserved),
            )
            .with_item(
                KMSElement::folder("folder-archive", "Archive").with_parent("folder-reports"),
            )
            .with_item(KMSElement::file("k-2019", "2019-report.pdf").with_parent("folder-archive"))
            .with_provider(
                drive,
                vec![
                    KMSElement::folder("g-designs", "Designs"),
                    KMSElement::file("g-roadmap", "roadmap.gdoc")
                        .with_status(KnowledgeStatus::Uploaded)
                        .with_brains(["brain-1"]),
                    KMSElement::file("g-logo", "logo.png").with_parent("g-designs"),
                ],
            )
            .with_provider(
                notion,
                vec![KMSElement::file("n-onboarding", "Onboarding")
                    .with_status(KnowledgeStatus::Reserved)],
            )
    }
}

fn children(items: &[KMSElement], folder_id: Option<&str>) -> Vec<KMSElement> {
    items
        .iter()
        .filter(|item| item.parent_id.as_deref() == folder_id)
        .cloned()
        .collect()
}

#[async_trait]
impl KnowledgeApi for MemoryBackend {
    async fn list_folder(&self, folder_id: Option<&str>) -> Result<Vec<KMSElement>> {
        let mut state = self.lock()?;
        state.list_calls += 1;
        if state.fail_listings {
            return Err(ExplorerError::Network("listing unavailable".to_string()));
        }
        if let Some(id) = folder_id {
            if !state.items.iter().any(|i| i.id == id && i.is_folder) {
                return Err(ExplorerError::NotFound(format!("folder {}", id)));
            }
        }
        Ok(children(&state.items, folder_id))
    }

    async fn list_provider_folder(
        &self,
        provider: &ProviderRef,
        folder_id: Option<&str>,
    ) -> Result<Vec<KMSElement>> {
        let mut state = self.lock()?;
        state.list_calls += 1;
        if state.fail_listings {
            return Err(ExplorerError::Network("listing unavailable".to_string()));
        }
        let items = state
            .provider_items
            .get(&provider.id)
            .ok_or_else(|| ExplorerError::NotFound(format!("provider {}", provider.id)))?;
        Ok(children(items, folder_id)
            .into_iter()
            .map(|item| item.with_source(provider.name.clone()))
            .collect())
    }
}

#[async_trait]
impl AssociationApi for MemoryBackend {
    async fn link_item_to_brain(&self, item_id: &str, brain_id: &str) -> Result<()> {
        let mut state = self.lock()?;
        state.link_calls += 1;

        if state.failing_brains.contains(brain_id) {
            return Err(ExplorerError::Api {
                status: 500,
                message: format!("Failed to link {} to {}", item_id, brain_id),
            });
        }
        if !state.brains.iter().any(|b| b.matches(brain_id)) {
            return Err(ExplorerError::NotFound(format!("brain {}", brain_id)));
        }

        let MemoryState {
            items,
            provider_items,
            ..
        } = &mut *state;
        let item = items
            .iter_mut()
            .chain(provider_items.values_mut().flatten())
            .find(|i| i.id == item_id)
            .ok_or_else(|| ExplorerError::NotFound(format!("knowledge {}", item_id)))?;
        item.add_brain(brain_id);
        Ok(())
    }
}

#[async_trait]
impl BrainDirectory for MemoryBackend {
    async fn list_brains(&self) -> Result<Vec<Brain>> {
        Ok(self.lock()?.brains.clone())
    }
}

#[async_trait]
impl ProviderDirectory for MemoryBackend {
    async fn list_providers(&self) -> Result<Vec<ProviderRef>> {
        Ok(self.lock()?.providers.clone())
    }
}
