//! Folder navigation and knowledge status state machine
//!
//! - [`KnowledgeStore`] owns the [`FolderContext`] and notifies subscribers
//! - [`RootSelector`] resets the context to the internal root
//! - [`FolderNavigator`] enters folders and providers
//! - [`ExplorerDispatcher`] picks the internal-root or provider view
//! - [`AssociationManager`] links a knowledge item to brains
//!
//! Fetches are started by an activation that takes a [`Generation`] and
//! applied later; superseded results are dropped.

mod association;
mod dispatcher;
mod generation;
mod navigator;
mod root_selector;
mod store;

pub use association::{
    write_links, AssociationManager, AssociationModal, BrainBadge, Indicator, LinkRequest,
    SubmitOutcome, UiEvent, DEFAULT_STUDIO_PATH,
};
pub use dispatcher::{ExplorerDispatcher, ExplorerView};
pub use generation::{ApplyOutcome, Generation, GenerationCounter};
pub use navigator::{FolderNavigator, NavFetch, NavTarget};
pub use root_selector::{RootFetch, RootSelector};
pub use store::{FolderContext, KnowledgeStore, SubscriptionId};
