//! Domain error types

use thiserror::Error;

/// Run parameters that can never produce a run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("no models requested")]
    NoModels,

    #[error("{role} model name cannot be blank")]
    BlankModelName { role: &'static str },

    #[error("prompt cannot be empty")]
    EmptyPrompt,

    #[error("per-model timeout must be greater than zero")]
    ZeroTimeout,
}
