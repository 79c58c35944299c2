//! Explorer dispatcher
//!
//! Picks which current-folder view to show from the folder context.

use super::store::{FolderContext, KnowledgeStore};

/// Current-folder view shown by the explorer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplorerView {
    ViewingInternalRoot,
    ViewingExternalProvider,
}

/// Chooses the visible view; re-evaluated on every render
#[derive(Debug, Default)]
pub struct ExplorerDispatcher {
    mounted: bool,
}

impl ExplorerDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// First mount marks the internal root as being explored. Later calls
    /// do nothing.
    pub fn mount(&mut self, store: &mut KnowledgeStore) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        store.set_exploring_quivr(true);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// A provider view wins as soon as a provider is active, and is also
    /// shown while the internal root has not been entered.
    pub fn view(ctx: &FolderContext) -> ExplorerView {
        if ctx.explored_provider.is_some() || !ctx.exploring_quivr {
            ExplorerView::ViewingExternalProvider
        } else {
            ExplorerView::ViewingInternalRoot
        }
    }

    pub fn current_view(&self, store: &KnowledgeStore) -> ExplorerView {
        Self::view(store.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{ProviderKind, ProviderRef};

    fn notion() -> ProviderRef {
        ProviderRef::new("sync-n", "Wiki", ProviderKind::Notion)
    }

    #[test]
    fn test_fresh_context_shows_provider_view() {
        let ctx = FolderContext::default();
        assert_eq!(ExplorerDispatcher::view(&ctx), ExplorerView::ViewingExternalProvider);
    }

    #[test]
    fn test_mount_switches_to_internal_root() {
        let mut store = KnowledgeStore::new();
        let mut dispatcher = ExplorerDispatcher::new();

        dispatcher.mount(&mut store);
        assert!(store.state().exploring_quivr);
        assert_eq!(dispatcher.current_view(&store), ExplorerView::ViewingInternalRoot);
    }

    #[test]
    fn test_mount_is_one_shot() {
        let mut store = KnowledgeStore::new();
        let mut dispatcher = ExplorerDispatcher::new();

        dispatcher.mount(&mut store);
        store.set_exploring_quivr(false);
        dispatcher.mount(&mut store);

        assert!(dispatcher.is_mounted());
        assert!(!store.state().exploring_quivr);
        assert_eq!(store.commit_count(), 2);
    }

    #[test]
    fn test_provider_takes_precedence() {
        let ctx = FolderContext {
            exploring_quivr: true,
            explored_provider: Some(notion()),
            ..FolderContext::default()
        };
        assert_eq!(ExplorerDispatcher::view(&ctx), ExplorerView::ViewingExternalProvider);
    }

    #[test]
    fn test_deactivated_provider_returns_to_root_view() {
        let mut store = KnowledgeStore::new();
        let mut dispatcher = ExplorerDispatcher::new();
        dispatcher.mount(&mut store);

        store.set_explored_provider(Some(notion()));
        assert_eq!(dispatcher.current_view(&store), ExplorerView::ViewingExternalProvider);

        store.set_quivr_root_selected(true);
        assert_eq!(dispatcher.current_view(&store), ExplorerView::ViewingInternalRoot);
        assert!(store.state().last_explored_provider.is_some());
    }
}
