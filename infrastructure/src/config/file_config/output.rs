//! Output configuration from TOML (`[output]` section)

use consensus_domain::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// Re-export OutputFormat from domain for convenience
pub use consensus_domain::OutputFormat as FileOutputFormat;

/// Directory auto-saved runs land in when nothing else is configured.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Output format (uses domain type)
    pub format: Option<OutputFormat>,
    /// Root directory for saved runs
    pub data_dir: PathBuf,
    /// Save every run under `data_dir`
    pub save: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            save: true,
        }
    }
}
