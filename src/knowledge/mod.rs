//! Knowledge data model
//!
//! Knowledge items, their sync status classification, the brains they can be
//! linked to and the external providers they can come from.

mod brain;
mod element;
mod provider;
mod status;

pub use brain::Brain;
pub use element::{FolderRef, KMSElement, LOCAL_SOURCE};
pub use provider::{ProviderKind, ProviderRef};
pub use status::{classify, is_error, is_waiting, KnowledgeStatus, StatusClass};
