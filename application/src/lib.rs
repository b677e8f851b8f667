//! Application layer for llm-consensus
//!
//! This crate contains use cases, port definitions, the provider registry,
//! and application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod registry;
pub mod use_cases;

// Re-export commonly used types
pub use config::{DEFAULT_TIMEOUT, RunParams};
pub use ports::{
    composite_progress::CompositeProgress,
    progress::{NoProgress, QueryProgressNotifier},
    provider::{ChunkCallback, FnProvider, Provider, ProviderError, ProviderFuture},
};
pub use registry::{ProviderRegistry, RegistryError};
pub use use_cases::run_consensus::{RunConsensusError, RunConsensusInput, RunConsensusUseCase};
pub use use_cases::run_query::{QueryRunner, RunQueryError};
pub use use_cases::synthesize::{Judge, SynthesizeError};
