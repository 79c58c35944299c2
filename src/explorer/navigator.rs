//! Folder navigation
//!
//! Entering folders and providers, going back up, refreshing the displayed
//! folder. Every navigation takes a generation, so only the newest one can
//! land in the store.

use super::generation::{ApplyOutcome, Generation, GenerationCounter};
use super::store::{FolderContext, KnowledgeStore};
use crate::api::KnowledgeApi;
use crate::knowledge::{FolderRef, KMSElement, ProviderRef};
use crate::Result;

/// Where a navigation goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavTarget {
    /// Top level of the internal root
    Root,
    /// Folder of the internal root
    Folder(FolderRef),
    /// Top level of a provider
    Provider(ProviderRef),
    /// Folder inside a provider
    ProviderFolder(ProviderRef, FolderRef),
}

impl NavTarget {
    /// Ask the listing API for this target's contents
    pub async fn fetch(&self, api: &dyn KnowledgeApi) -> Result<Vec<KMSElement>> {
        match self {
            NavTarget::Root => api.list_folder(None).await,
            NavTarget::Folder(folder) => api.list_folder(Some(&folder.id)).await,
            NavTarget::Provider(provider) => api.list_provider_folder(provider, None).await,
            NavTarget::ProviderFolder(provider, folder) => {
                api.list_provider_folder(provider, Some(&folder.id)).await
            }
        }
    }

    fn folder(&self) -> Option<&FolderRef> {
        match self {
            NavTarget::Folder(folder) | NavTarget::ProviderFolder(_, folder) => Some(folder),
            _ => None,
        }
    }
}

/// A navigation fetch in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavFetch {
    pub generation: Generation,
    pub target: NavTarget,
}

/// Folder navigation with a breadcrumb trail
#[derive(Debug, Clone, Default)]
pub struct FolderNavigator {
    generation: GenerationCounter,
    trail: Vec<FolderRef>,
}

impl FolderNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share a generation counter with the root selector
    pub fn with_generation(generation: GenerationCounter) -> Self {
        Self {
            generation,
            trail: Vec::new(),
        }
    }

    /// Folders from the current root down to the displayed folder
    pub fn path(&self) -> &[FolderRef] {
        &self.trail
    }

    fn start(&self, target: NavTarget) -> NavFetch {
        let generation = self.generation.advance();
        tracing::debug!(generation = generation.value(), nav_target = ?target, "Navigation started");
        NavFetch { generation, target }
    }

    /// Enter a folder of whichever root is active
    pub fn open_folder(&self, ctx: &FolderContext, folder: FolderRef) -> NavFetch {
        let target = match &ctx.explored_provider {
            Some(provider) => NavTarget::ProviderFolder(provider.clone(), folder),
            None => NavTarget::Folder(folder),
        };
        self.start(target)
    }

    pub fn open_provider(&self, provider: ProviderRef) -> NavFetch {
        self.start(NavTarget::Provider(provider))
    }

    pub fn open_root(&self) -> NavFetch {
        self.start(NavTarget::Root)
    }

    /// Go to the parent of the displayed folder. `None` when already at a root.
    pub fn go_up(&self, ctx: &FolderContext) -> Option<NavFetch> {
        ctx.current_folder.as_ref()?;

        let parent = self
            .trail
            .len()
            .checked_sub(2)
            .and_then(|i| self.trail.get(i))
            .cloned();

        let target = match (parent, &ctx.explored_provider) {
            (Some(folder), Some(provider)) => NavTarget::ProviderFolder(provider.clone(), folder),
            (Some(folder), None) => NavTarget::Folder(folder),
            (None, Some(provider)) => NavTarget::Provider(provider.clone()),
            (None, None) => NavTarget::Root,
        };
        Some(self.start(target))
    }

    /// Re-fetch the displayed folder; items gone upstream disappear
    pub fn refresh(&self, ctx: &FolderContext) -> NavFetch {
        let target = match (&ctx.current_folder, &ctx.explored_provider) {
            (Some(folder), Some(provider)) => {
                NavTarget::ProviderFolder(provider.clone(), folder.clone())
            }
            (Some(folder), None) => NavTarget::Folder(folder.clone()),
            (None, Some(provider)) => NavTarget::Provider(provider.clone()),
            (None, None) => NavTarget::Root,
        };
        self.start(target)
    }

    /// Hand back the result of a navigation fetch
    pub fn apply(
        &mut self,
        store: &mut KnowledgeStore,
        fetch: NavFetch,
        result: Result<Vec<KMSElement>>,
    ) -> ApplyOutcome {
        if !self.generation.is_current(fetch.generation) {
            tracing::debug!(
                generation = fetch.generation.value(),
                current = self.generation.current().value(),
                "Discarding stale listing"
            );
            return ApplyOutcome::Stale;
        }

        let listing = match result {
            Ok(listing) => listing,
            Err(e) => {
                tracing::error!(nav_target = ?fetch.target, error = %e, "Failed to list folder");
                return ApplyOutcome::Failed;
            }
        };

        self.update_trail(fetch.target.folder());
        let target = fetch.target;
        store.commit(move |ctx| {
            match target {
                NavTarget::Root => {
                    ctx.current_folder = None;
                    ctx.quivr_root_selected = true;
                    ctx.explored_provider = None;
                }
                NavTarget::Folder(folder) => {
                    ctx.current_folder = Some(folder);
                }
                NavTarget::Provider(provider) => {
                    ctx.current_folder = None;
                    ctx.quivr_root_selected = false;
                    ctx.explored_provider = Some(provider);
                }
                NavTarget::ProviderFolder(provider, folder) => {
                    ctx.current_folder = Some(folder);
                    ctx.quivr_root_selected = false;
                    ctx.explored_provider = Some(provider);
                }
            }
            ctx.listing = listing;
        });
        ApplyOutcome::Applied
    }

    fn update_trail(&mut self, folder: Option<&FolderRef>) {
        match folder {
            None => self.trail.clear(),
            Some(folder) => {
                if let Some(pos) = self.trail.iter().position(|f| f.id == folder.id) {
                    self.trail.truncate(pos + 1);
                } else {
                    self.trail.push(folder.clone());
                }
            }
        }
    }

    /// Forget the trail, e.g. after the root selector reset the context
    pub fn reset_trail(&mut self) {
        self.trail.clear();
    }

    /// Navigate and wait for the fetch in one step
    pub async fn navigate(
        &mut self,
        store: &mut KnowledgeStore,
        api: &dyn KnowledgeApi,
        fetch: NavFetch,
    ) -> ApplyOutcome {
        let result = fetch.target.fetch(api).await;
        self.apply(store, fetch, result)
    }
}
