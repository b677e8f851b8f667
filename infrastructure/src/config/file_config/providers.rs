//! Provider configuration from TOML (`[providers.<model>]` tables)
//!
//! Each table binds one model id to the provider that serves it:
//!
//! ```toml
//! [providers.gpt]
//! kind = "command"
//! command = ["llm", "-m", "gpt-4o"]
//! provider = "openai"
//!
//! [providers.echo]
//! kind = "static"
//! response = "hello"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw provider entry, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FileProviderConfig {
    /// Run an external program; the prompt goes to stdin, stdout is the answer.
    Command {
        /// Program followed by its arguments
        command: Vec<String>,
        /// Provider name reported in responses (default: the program name)
        #[serde(default)]
        provider: Option<String>,
        /// Extra environment variables for the child process
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        env: BTreeMap<String, String>,
    },
    /// Always answer with the same text.
    Static {
        response: String,
        /// Provider name reported in responses (default: "static")
        #[serde(default)]
        provider: Option<String>,
        /// Artificial latency, handy for exercising progress displays
        #[serde(default)]
        delay_ms: Option<u64>,
    },
}

impl FileProviderConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            FileProviderConfig::Command { .. } => "command",
            FileProviderConfig::Static { .. } => "static",
        }
    }
}

/// `[providers]` section: model id → provider entry
pub type FileProvidersConfig = BTreeMap<String, FileProviderConfig>;
