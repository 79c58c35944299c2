//! Root selector
//!
//! The "Quivr" header of the explorer. Toggling it fetches the top level of
//! the internal root and, if that fetch is still the newest one, resets the
//! folder context to the root.

use super::generation::{ApplyOutcome, Generation, GenerationCounter};
use super::store::KnowledgeStore;
use crate::api::KnowledgeApi;
use crate::knowledge::KMSElement;
use crate::Result;

/// A root fetch started by an activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootFetch {
    pub generation: Generation,
}

/// Toggle control for the internal root
#[derive(Debug, Clone)]
pub struct RootSelector {
    folded: bool,
    generation: GenerationCounter,
}

impl Default for RootSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl RootSelector {
    pub fn new() -> Self {
        Self::with_generation(GenerationCounter::new())
    }

    /// Share a generation counter with other navigation controls
    pub fn with_generation(generation: GenerationCounter) -> Self {
        Self {
            folded: true,
            generation,
        }
    }

    pub fn is_folded(&self) -> bool {
        self.folded
    }

    /// Start the fetch issued when the selector is first shown
    pub fn mount(&self) -> RootFetch {
        RootFetch {
            generation: self.generation.advance(),
        }
    }

    /// User toggled the selector. Every activation starts a new fetch;
    /// earlier ones are left running and discarded when they land.
    pub fn activate(&mut self) -> RootFetch {
        self.folded = !self.folded;
        let generation = self.generation.advance();
        tracing::debug!(generation = generation.value(), folded = self.folded, "Root selector activated");
        RootFetch { generation }
    }

    /// Hand back the result of a root fetch
    pub fn apply(
        &self,
        store: &mut KnowledgeStore,
        fetch: RootFetch,
        result: Result<Vec<KMSElement>>,
    ) -> ApplyOutcome {
        if !self.generation.is_current(fetch.generation) {
            tracing::debug!(
                generation = fetch.generation.value(),
                current = self.generation.current().value(),
                "Discarding stale root listing"
            );
            return ApplyOutcome::Stale;
        }

        match result {
            Ok(listing) => {
                tracing::debug!(items = listing.len(), "Internal root selected");
                store.commit(|ctx| {
                    ctx.current_folder = None;
                    ctx.quivr_root_selected = true;
                    ctx.explored_provider = None;
                    ctx.listing = listing;
                });
                ApplyOutcome::Applied
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to get files");
                ApplyOutcome::Failed
            }
        }
    }

    /// Activate and wait for the fetch in one step
    pub async fn toggle(&mut self, store: &mut KnowledgeStore, api: &dyn KnowledgeApi) -> ApplyOutcome {
        let fetch = self.activate();
        let result = api.list_folder(None).await;
        self.apply(store, fetch, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryBackend;
    use crate::knowledge::{FolderRef, ProviderKind, ProviderRef};
    use crate::ExplorerError;

    fn listing(name: &str) -> Vec<KMSElement> {
        vec![KMSElement::file(name, name)]
    }

    #[test]
    fn test_activation_toggles_fold() {
        let mut selector = RootSelector::new();
        assert!(selector.is_folded());
        selector.activate();
        assert!(!selector.is_folded());
        selector.activate();
        assert!(selector.is_folded());
    }

    #[test]
    fn test_success_resets_to_root() {
        let mut store = KnowledgeStore::new();
        store.set_current_folder(Some(FolderRef::new("d1", "Reports")));
        store.set_explored_provider(Some(ProviderRef::new("s1", "Drive", ProviderKind::Google)));

        let mut selector = RootSelector::new();
        let fetch = selector.activate();
        let outcome = selector.apply(&mut store, fetch, Ok(listing("a")));

        assert_eq!(outcome, ApplyOutcome::Applied);
        let ctx = store.state();
        assert!(ctx.current_folder.is_none());
        assert!(ctx.quivr_root_selected);
        assert!(ctx.explored_provider.is_none());
        assert_eq!(ctx.listing[0].id, "a");
    }

    #[test]
    fn test_success_is_a_single_commit() {
        let mut store = KnowledgeStore::new();
        let mut selector = RootSelector::new();
        let fetch = selector.activate();
        selector.apply(&mut store, fetch, Ok(listing("a")));
        assert_eq!(store.commit_count(), 1);
    }

    #[test]
    fn test_failure_leaves_store_unchanged() {
        let mut store = KnowledgeStore::new();
        store.set_current_folder(Some(FolderRef::new("d1", "Reports")));
        let before = store.state().clone();

        let mut selector = RootSelector::new();
        let fetch = selector.activate();
        let outcome = selector.apply(
            &mut store,
            fetch,
            Err(ExplorerError::Network("connection reset".into())),
        );

        assert_eq!(outcome, ApplyOutcome::Failed);
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut store = KnowledgeStore::new();
        let mut selector = RootSelector::new();

        let first = selector.activate();
        let second = selector.activate();

        // Second lands first, then the older one
        assert_eq!(
            selector.apply(&mut store, second, Ok(listing("new"))),
            ApplyOutcome::Applied
        );
        assert_eq!(
            selector.apply(&mut store, first, Ok(listing("old"))),
            ApplyOutcome::Stale
        );

        assert_eq!(store.state().listing[0].id, "new");
        assert_eq!(store.commit_count(), 1);
    }

    #[test]
    fn test_stale_failure_is_silent() {
        let mut store = KnowledgeStore::new();
        let mut selector = RootSelector::new();
        let first = selector.activate();
        let _second = selector.activate();

        let outcome = selector.apply(&mut store, first, Err(ExplorerError::Network("x".into())));
        assert_eq!(outcome, ApplyOutcome::Stale);
    }

    #[test]
    fn test_mount_does_not_toggle() {
        let selector = RootSelector::new();
        let fetch = selector.mount();
        assert!(selector.is_folded());
        assert_eq!(fetch.generation.value(), 1);
    }

    #[tokio::test]
    async fn test_toggle_against_backend() {
        let backend = MemoryBackend::demo();
        let mut store = KnowledgeStore::new();
        let mut selector = RootSelector::new();

        let outcome = selector.toggle(&mut store, &backend).await;
        assert_eq!(outcome, ApplyOutcome::Applied);
        assert!(store.state().quivr_root_selected);
        assert!(!store.state().listing.is_empty());

        backend.set_fail_listings(true);
        let before = store.state().clone();
        let outcome = selector.toggle(&mut store, &backend).await;
        assert_eq!(outcome, ApplyOutcome::Failed);
        assert_eq!(store.state(), &before);
    }
}
