//! Run result value object

use crate::core::response::ModelResponse;
use serde::{Deserialize, Serialize};

/// Outcome of querying a list of models with the same prompt
///
/// Every requested model ends up either in `responses` or in
/// `failed_models`, so `responses.len() + failed_models.len()` equals the
/// number of requested models. `responses` is in completion order.
///
/// A `RunResult` handed out by the runner always has at least one response;
/// a run where every model failed is reported as an error instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub responses: Vec<ModelResponse>,
    pub warnings: Vec<String>,
    pub failed_models: Vec<String>,
}

impl RunResult {
    /// Number of models that were attempted (succeeded + failed).
    pub fn attempted(&self) -> usize {
        self.responses.len() + self.failed_models.len()
    }

    /// Returns `true` if at least one model failed but others succeeded.
    pub fn is_partial(&self) -> bool {
        !self.responses.is_empty() && !self.failed_models.is_empty()
    }

    /// Look up the response of a specific model.
    pub fn response_for(&self, model: &str) -> Option<&ModelResponse> {
        self.responses.iter().find(|r| r.model == model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(responses: &[&str], failed: &[&str]) -> RunResult {
        RunResult {
            responses: responses
                .iter()
                .map(|m| ModelResponse::new(*m, format!("from {m}"), "test"))
                .collect(),
            warnings: failed.iter().map(|m| format!("{m}: boom")).collect(),
            failed_models: failed.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn test_attempted_counts_both_sides() {
        let result = result_with(&["a", "b"], &["c"]);
        assert_eq!(result.attempted(), 3);
    }

    #[test]
    fn test_is_partial() {
        assert!(result_with(&["a"], &["b"]).is_partial());
        assert!(!result_with(&["a", "b"], &[]).is_partial());
        assert!(!result_with(&[], &["a"]).is_partial());
    }

    #[test]
    fn test_response_for() {
        let result = result_with(&["a", "b"], &[]);
        assert_eq!(result.response_for("b").unwrap().content, "from b");
        assert!(result.response_for("z").is_none());
    }
}
