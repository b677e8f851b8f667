//! Concrete [`Provider`](consensus_application::Provider) implementations
//! and the catalog that maps model ids onto them.

pub mod catalog;
pub mod command;
pub mod fixed;

pub use catalog::{CatalogError, ProviderCatalog, build_registry};
pub use command::CommandProvider;
pub use fixed::StaticProvider;

use crate::config::FileProviderConfig;

/// The kind of backend serving a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// External program (see [`CommandProvider`])
    Command,
    /// Canned response (see [`StaticProvider`])
    Static,
}

impl From<&FileProviderConfig> for ProviderKind {
    fn from(config: &FileProviderConfig) -> Self {
        match config {
            FileProviderConfig::Command { .. } => ProviderKind::Command,
            FileProviderConfig::Static { .. } => ProviderKind::Static,
        }
    }
}
