//! Infrastructure layer for llm-consensus
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: configuration loading, concrete providers,
//! run persistence, and the progress-event log.

pub mod config;
pub mod logging;
pub mod persistence;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileOutputConfig, FileOutputFormat,
    FileProviderConfig, FileRunConfig,
};
pub use logging::JsonlProgressLog;
pub use persistence::{PersistenceError, RunDirectoryStore, write_result_json};
pub use providers::{
    CatalogError, CommandProvider, ProviderCatalog, ProviderKind, StaticProvider, build_registry,
};
