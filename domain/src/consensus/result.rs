//! Consensus result - the durable output record of a run.
//!
//! The serialized field names are a stable contract relied on by saved runs
//! and scripts:
//!
//! ```json
//! {
//!   "prompt": "...",
//!   "responses": [{"model": "...", "content": "...", "provider": "...", "latency_ms": 1234}],
//!   "consensus": "...",
//!   "judge": "...",
//!   "warnings": ["model: error"],
//!   "failed_models": ["model"]
//! }
//! ```
//!
//! `warnings` and `failed_models` are omitted when empty.

use crate::core::response::ModelResponse;
use crate::run::result::RunResult;
use serde::{Deserialize, Serialize};

/// Complete result of a consensus run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// The original user prompt
    pub prompt: String,
    /// Successful model responses, in completion order
    pub responses: Vec<ModelResponse>,
    /// The synthesized answer
    pub consensus: String,
    /// Model that produced the consensus
    #[serde(rename = "judge")]
    pub judge_model: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_models: Vec<String>,
}

impl ConsensusResult {
    /// Assemble the final record from a run and the judge output.
    pub fn from_run(
        prompt: impl Into<String>,
        run: RunResult,
        consensus: impl Into<String>,
        judge_model: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            responses: run.responses,
            consensus: consensus.into(),
            judge_model: judge_model.into(),
            warnings: run.warnings,
            failed_models: run.failed_models,
        }
    }

    /// Number of models that were queried.
    pub fn requested_count(&self) -> usize {
        self.responses.len() + self.failed_models.len()
    }

    /// Number of models that answered.
    pub fn succeeded_count(&self) -> usize {
        self.responses.len()
    }

    /// Models that answered, in completion order.
    pub fn models(&self) -> Vec<&str> {
        self.responses.iter().map(|r| r.model.as_str()).collect()
    }
}
