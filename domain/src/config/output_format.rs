//! Output format value object

use serde::{Deserialize, Serialize};

/// How a consensus result is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Every model response, the consensus, and a run summary (default)
    Full,
    /// Only the consensus text
    Consensus,
    /// The JSON result record
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Full
    }
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Full => "full",
            OutputFormat::Consensus => "consensus",
            OutputFormat::Json => "json",
        }
    }
}
