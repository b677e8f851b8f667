//! Query request value object

use serde::{Deserialize, Serialize};

/// A single query: one prompt addressed to one model (Value Object)
///
/// Built once per attempt by the runner (or the judge) and handed to a
/// provider by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Model identifier as registered in the provider registry
    pub model: String,
    /// The prompt text, sent verbatim
    pub prompt: String,
}

impl QueryRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_creation() {
        let request = QueryRequest::new("gpt", "What is Rust?");
        assert_eq!(request.model, "gpt");
        assert_eq!(request.prompt, "What is Rust?");
    }
}
