//! Run parameters: inputs controlling a single consensus run.
//!
//! [`RunParams`] groups the static parameters of
//! [`RunConsensusUseCase`](crate::use_cases::run_consensus::RunConsensusUseCase).
//! These are application-layer concerns: where they come from (flags,
//! config file, defaults) is decided by the outer layers.

use consensus_domain::DomainError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default per-model timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Parameters of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParams {
    /// Models to query, in request order.
    pub models: Vec<String>,
    /// Model that synthesizes the consensus.
    pub judge: String,
    /// Upper bound for each model's query, independent of siblings.
    pub timeout: Duration,
}

impl RunParams {
    pub fn new(models: Vec<String>, judge: impl Into<String>) -> Self {
        Self {
            models,
            judge: judge.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    // ==================== Validation ====================

    /// Reject parameters that cannot produce a run.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.models.is_empty() {
            return Err(DomainError::NoModels);
        }
        if self.models.iter().any(|m| m.trim().is_empty()) {
            return Err(DomainError::BlankModelName { role: "queried" });
        }
        if self.judge.trim().is_empty() {
            return Err(DomainError::BlankModelName { role: "judge" });
        }
        if self.timeout.is_zero() {
            return Err(DomainError::ZeroTimeout);
        }
        Ok(())
    }
}
