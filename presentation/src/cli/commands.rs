//! CLI command definitions

use clap::{Parser, ValueEnum};
use consensus_domain::OutputFormat as DomainOutputFormat;
use std::path::PathBuf;
use std::time::Duration;

/// Output format for consensus results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every model response, the consensus, and a run summary
    Full,
    /// Only the consensus text
    Consensus,
    /// JSON result record
    Json,
}

impl From<OutputFormat> for DomainOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => DomainOutputFormat::Full,
            OutputFormat::Consensus => DomainOutputFormat::Consensus,
            OutputFormat::Json => DomainOutputFormat::Json,
        }
    }
}

/// CLI arguments for llm-consensus
#[derive(Parser, Debug)]
#[command(name = "llm-consensus")]
#[command(author, version, about = "Query several LLMs at once and synthesize a consensus")]
#[command(long_about = r#"
llm-consensus sends one prompt to several models in parallel, then asks a
judge model to reconcile their answers into a single consensus.

Models that fail or time out are reported as warnings; the run only fails
when no model answers. With a single surviving answer the judge is skipped.

The prompt comes from (in priority order):
1. Positional arguments
2. --file <path>
3. Piped stdin

Configuration files are loaded from (in priority order):
1. LLM_CONSENSUS_* environment variables
2. --config <path>       Explicit config file
3. ./consensus.toml      Project-level config
4. ~/.config/llm-consensus/config.toml   Global config

Example:
  llm-consensus -m gpt,claude -j gpt "Explain the CAP theorem"
  llm-consensus -m gpt -m claude -f prompt.md --format consensus
  cat question.txt | llm-consensus --json > result.json
"#)]
pub struct Cli {
    /// The prompt (words are joined with spaces)
    #[arg(value_name = "PROMPT")]
    pub prompt: Vec<String>,

    /// Models to query, comma separated (can be specified multiple times)
    #[arg(short, long, value_name = "MODELS", value_delimiter = ',')]
    pub models: Vec<String>,

    /// Model that synthesizes the consensus
    #[arg(short, long, value_name = "MODEL")]
    pub judge: Option<String>,

    /// Read the prompt from a file
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Write the JSON result to this file instead of the data directory
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Directory for auto-saved runs
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Per-model timeout in seconds
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Print the JSON result to stdout (implies --no-save)
    #[arg(long)]
    pub json: bool,

    /// Don't auto-save results to the data directory
    #[arg(long)]
    pub no_save: bool,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Append every progress event as JSON lines to this file
    #[arg(long, value_name = "PATH")]
    pub event_log: Option<PathBuf>,
}

impl Cli {
    /// Requested models: trimmed, blanks dropped, duplicates collapsed, order kept.
    pub fn model_list(&self) -> Vec<String> {
        normalize_models(&self.models)
    }

    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    /// `--json` wins over `--format`.
    pub fn output_format(&self) -> Option<DomainOutputFormat> {
        if self.json {
            Some(DomainOutputFormat::Json)
        } else {
            self.format.map(Into::into)
        }
    }
}

/// Trim, drop blanks, and collapse duplicates while keeping first-seen order.
pub fn normalize_models<S: AsRef<str>>(models: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(models.len());
    for model in models {
        let model = model.as_ref().trim();
        if !model.is_empty() && !out.iter().any(|m| m == model) {
            out.push(model.to_string());
        }
    }
    out
}
