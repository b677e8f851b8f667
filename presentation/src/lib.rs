//! Presentation layer for llm-consensus
//!
//! This crate contains the CLI definition, prompt-source resolution,
//! output formatters, and progress reporters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat, normalize_models};
pub use cli::prompt::{PromptError, read_prompt, resolve_prompt};
pub use output::console::ConsoleFormatter;
pub use output::formatter::OutputFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
