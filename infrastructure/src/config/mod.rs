//! Configuration file loading for llm-consensus
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `LLM_CONSENSUS_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./consensus.toml` or `./.consensus.toml`
//! 4. Global: `<platform config dir>/llm-consensus/config.toml` (see
//!    [`ConfigLoader::global_config_path`])
//! 5. Default values
//!
//! Command-line flags are applied on top by the binary.

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_DATA_DIR, FileConfig, FileOutputConfig, FileOutputFormat,
    FileProviderConfig, FileProvidersConfig, FileRunConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
