//! Folder context store
//!
//! Session-scoped state describing where the user is browsing. The store is
//! an owned value handed by `&mut` to whoever mutates it; every state change
//! goes through [`KnowledgeStore::commit`], which notifies subscribers once.

use crate::knowledge::{FolderRef, KMSElement, ProviderRef};

/// Browsing state of the explorer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderContext {
    /// Displayed folder; `None` means "at a root"
    pub current_folder: Option<FolderRef>,

    /// Internal root is the active selection
    pub quivr_root_selected: bool,

    /// Internal root has been entered at least once this session
    pub exploring_quivr: bool,

    /// Active external provider; `None` when no provider is active
    pub explored_provider: Option<ProviderRef>,

    /// Most recent provider explored, kept after it is deactivated
    pub last_explored_provider: Option<ProviderRef>,

    /// Contents of the displayed folder
    pub listing: Vec<KMSElement>,
}

impl FolderContext {
    pub fn is_quivr_root_active(&self) -> bool {
        self.quivr_root_selected
    }

    pub fn is_provider_active(&self) -> bool {
        self.explored_provider.is_some()
    }

    pub fn find_item(&self, id: &str) -> Option<&KMSElement> {
        self.listing.iter().find(|item| item.id == id)
    }

    /// Restore the root/provider mutual exclusion after a write.
    ///
    /// Whichever side was switched on by this write wins.
    fn normalize(&mut self, before: &FolderContext) {
        let root_turned_on = self.quivr_root_selected && !before.quivr_root_selected;
        let provider_changed = self.explored_provider.is_some()
            && self.explored_provider != before.explored_provider;

        if self.quivr_root_selected && self.explored_provider.is_some() {
            if root_turned_on || !provider_changed {
                self.explored_provider = None;
            } else {
                self.quivr_root_selected = false;
            }
        }

        if self.explored_provider.is_some() && self.explored_provider != before.explored_provider {
            self.last_explored_provider = self.explored_provider.clone();
        } else if self.explored_provider.is_none() && before.explored_provider.is_some() {
            // Deactivated provider stays available as "last explored"
            self.last_explored_provider = before.explored_provider.clone();
        }
    }
}

/// Handle returned by [`KnowledgeStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&FolderContext)>;

/// Owner of the [`FolderContext`] with an explicit subscriber list
pub struct KnowledgeStore {
    state: FolderContext,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    commits: u64,
}

impl Default for KnowledgeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KnowledgeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeStore")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .field("commits", &self.commits)
            .finish()
    }
}

impl KnowledgeStore {
    pub fn new() -> Self {
        Self::with_state(FolderContext::default())
    }

    pub fn with_state(mut state: FolderContext) -> Self {
        state.normalize(&FolderContext::default());
        Self {
            state,
            subscribers: Vec::new(),
            next_subscription: 0,
            commits: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> &FolderContext {
        &self.state
    }

    /// Number of commits that changed state
    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    /// Register a callback run after every changing commit
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&FolderContext) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Apply a batch of writes as one commit.
    ///
    /// Subscribers are notified once if the state changed and not at all
    /// otherwise. Returns whether the state changed.
    pub fn commit<F>(&mut self, update: F) -> bool
    where
        F: FnOnce(&mut FolderContext),
    {
        let before = self.state.clone();
        update(&mut self.state);
        self.state.normalize(&before);

        if self.state == before {
            return false;
        }

        self.commits += 1;
        tracing::trace!(
            commit = self.commits,
            quivr_root_selected = self.state.quivr_root_selected,
            exploring_quivr = self.state.exploring_quivr,
            provider = self.state.explored_provider.as_ref().map(|p| p.id.as_str()),
            folder = self.state.current_folder.as_ref().map(|f| f.id.as_str()),
            "Folder context committed"
        );

        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&self.state);
        }
        true
    }

    pub fn set_current_folder(&mut self, folder: Option<FolderRef>) {
        self.commit(|ctx| ctx.current_folder = folder);
    }

    /// Mark the internal root as the active selection.
    ///
    /// Selecting the root deactivates any active provider.
    pub fn set_quivr_root_selected(&mut self, selected: bool) {
        self.commit(|ctx| {
            ctx.quivr_root_selected = selected;
            if selected {
                ctx.explored_provider = None;
            }
        });
    }

    pub fn set_exploring_quivr(&mut self, exploring: bool) {
        self.commit(|ctx| ctx.exploring_quivr = exploring);
    }

    /// Activate (or deactivate) an external provider.
    ///
    /// Activating a provider deselects the internal root.
    pub fn set_explored_provider(&mut self, provider: Option<ProviderRef>) {
        self.commit(|ctx| {
            if provider.is_some() {
                ctx.quivr_root_selected = false;
            }
            ctx.explored_provider = provider;
        });
    }

    pub fn set_listing(&mut self, listing: Vec<KMSElement>) {
        self.commit(|ctx| ctx.listing = listing);
    }

    /// Modify one item of the displayed listing in place.
    ///
    /// Returns false if no item with `id` is displayed.
    pub fn update_item<F>(&mut self, id: &str, update: F) -> bool
    where
        F: FnOnce(&mut KMSElement),
    {
        if self.state.find_item(id).is_none() {
            return false;
        }
        self.commit(|ctx| {
            if let Some(item) = ctx.listing.iter_mut().find(|item| item.id == id) {
                update(item);
            }
        });
        true
    }
}
