//! kms-explorer - terminal explorer for a Quivr knowledge base
//!
//! Browse the internal knowledge root and connected providers, see each
//! item's processing status and link knowledge to brains.
//!
//! # Architecture
//!
//! - **knowledge**: Domain types (KMSElement, Brain, ProviderRef, status)
//! - **explorer**: Folder-context store and the components that drive it
//! - **api**: Collaborator traits, the HTTP client and an in-memory backend
//! - **config**: YAML configuration and validation
//! - **tui**: Terminal UI (ratatui-based)

pub mod api;
pub mod config;
pub mod error;
pub mod explorer;
pub mod knowledge;
pub mod logging;
pub mod tui;

// Re-exports
pub use error::{ExplorerError, Result};
