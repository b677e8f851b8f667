//! Run defaults from TOML (`[run]` section)

use consensus_application::DEFAULT_TIMEOUT;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw run configuration from TOML
///
/// # Example
///
/// ```toml
/// [run]
/// models = ["gpt", "claude"]
/// judge = "gpt"
/// timeout_secs = 120
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRunConfig {
    /// Models queried when `--models` is not given
    pub models: Vec<String>,
    /// Judge used when `--judge` is not given
    pub judge: Option<String>,
    /// Per-model timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl FileRunConfig {
    /// Configured per-model timeout, or the built-in default.
    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }
}
