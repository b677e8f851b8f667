//! CLI entrypoint for llm-consensus
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use consensus_application::{CompositeProgress, RunConsensusInput, RunConsensusUseCase, RunParams};
use consensus_domain::{ConsensusResult, OutputFormat};
use consensus_infrastructure::{
    ConfigLoader, FileConfig, JsonlProgressLog, ProviderCatalog, RunDirectoryStore,
    build_registry, write_result_json,
};
use consensus_presentation::{
    Cli, ConsoleFormatter, ProgressReporter, SimpleProgress, normalize_models, read_prompt,
};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Everything a run needs, after merging config file and flags.
#[derive(Debug, Clone, PartialEq)]
struct RunSettings {
    models: Vec<String>,
    judge: String,
    timeout: Duration,
    format: OutputFormat,
    /// Directory to auto-save into, if saving is on
    save_dir: Option<PathBuf>,
    output_file: Option<PathBuf>,
    /// Render the result to stdout (off for `--output` without a format)
    render: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging based on verbosity level; `RUST_LOG` wins when set.
fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("loading configuration")?
    };
    for issue in config.check()? {
        warn!("{}", issue.message);
    }

    let interactive = std::io::stderr().is_terminal() && !cli.quiet && !cli.json;
    let settings = resolve_settings(&cli, &config, interactive)?;

    let prompt = read_prompt(&cli.prompt, cli.file.as_deref())?;
    if prompt.trim().is_empty() {
        bail!("prompt is empty");
    }

    info!("Starting llm-consensus");

    // === Dependency Injection ===
    let catalog = ProviderCatalog::from_config(&config);
    if catalog.is_empty() {
        bail!("no providers configured: add [providers.<model>] tables to consensus.toml");
    }
    let registry = Arc::new(build_registry(&catalog, &settings.models, &settings.judge));

    let cancellation = CancellationToken::new();
    {
        let token = cancellation.clone();
        tokio::spawn(async move {
            let signal = shutdown_signal().await;
            warn!("Received {}, cancelling in-flight queries", signal);
            token.cancel();
        });
    }

    // Progress observers
    let reporter = interactive.then(|| ProgressReporter::new(&settings.models, &settings.judge));
    let simple = (!interactive && !cli.quiet && !cli.json).then_some(SimpleProgress);
    let event_log = match &cli.event_log {
        Some(path) => Some(
            JsonlProgressLog::new(path)
                .with_context(|| format!("creating event log {}", path.display()))?,
        ),
        None => None,
    };

    let mut progress = CompositeProgress::new(Vec::new());
    if let Some(reporter) = &reporter {
        progress.push(reporter);
    }
    if let Some(simple) = &simple {
        progress.push(simple);
    }
    if let Some(log) = &event_log {
        progress.push(log);
    }

    if interactive {
        eprint!("{}", ConsoleFormatter::header(&prompt));
        eprint!("{}", ConsoleFormatter::phase("Querying models..."));
    }

    let started = Instant::now();
    let use_case = RunConsensusUseCase::new(registry).with_cancellation(cancellation);
    let params = RunParams::new(settings.models.clone(), settings.judge.clone())
        .with_timeout(settings.timeout);
    let outcome = use_case
        .execute_with_progress(RunConsensusInput::new(prompt, params), &progress)
        .await;

    if let Some(reporter) = &reporter {
        reporter.finish();
    }
    let result = outcome?;

    if interactive {
        eprint!("{}", ConsoleFormatter::success("Consensus reached!"));
    }

    persist(&settings, &result, interactive)?;

    if settings.render {
        print!("{}", render(&result, settings.format, started.elapsed()));
    }

    Ok(())
}

/// Resolve on the first of SIGINT (Ctrl-C) or SIGTERM, returning its name.
async fn shutdown_signal() -> &'static str {
    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                warn!("Cannot listen for Ctrl-C: {}", e);
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                "SIGTERM"
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM: {}", e);
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    }
}

/// Merge flags over config; flags win.
fn resolve_settings(cli: &Cli, config: &FileConfig, interactive: bool) -> Result<RunSettings> {
    let models = if cli.models.is_empty() {
        normalize_models(&config.run.models)
    } else {
        cli.model_list()
    };
    if models.is_empty() {
        bail!("no models given: use --models or set [run] models in the config");
    }

    let judge = match cli.judge.clone().or_else(|| config.run.judge.clone()) {
        Some(judge) if !judge.trim().is_empty() => judge.trim().to_string(),
        _ => {
            info!("No judge configured, using {}", models[0]);
            models[0].clone()
        }
    };

    let timeout = cli
        .timeout_duration()
        .unwrap_or_else(|| config.run.timeout());
    if timeout.is_zero() {
        bail!("timeout must be greater than 0");
    }

    let explicit_format = cli.output_format().or(config.output.format);
    let format = explicit_format.unwrap_or(if interactive {
        OutputFormat::Full
    } else {
        OutputFormat::Json
    });

    let save = config.output.save && !cli.no_save && !cli.json && cli.output.is_none();
    let save_dir = save.then(|| {
        cli.data_dir
            .clone()
            .unwrap_or_else(|| config.output.data_dir.clone())
    });

    Ok(RunSettings {
        models,
        judge,
        timeout,
        format,
        save_dir,
        output_file: cli.output.clone(),
        render: cli.output.is_none() || explicit_format.is_some(),
    })
}

fn persist(settings: &RunSettings, result: &ConsensusResult, interactive: bool) -> Result<()> {
    if let Some(path) = &settings.output_file {
        write_result_json(path, result)?;
        if interactive {
            eprint!(
                "{}",
                ConsoleFormatter::success(&format!("Result written to {}", path.display()))
            );
        }
    } else if let Some(dir) = &settings.save_dir {
        let run_dir = RunDirectoryStore::new(dir).save(result)?;
        if interactive {
            eprint!(
                "{}",
                ConsoleFormatter::success(&format!("Run saved to {}", run_dir.display()))
            );
        }
    }
    Ok(())
}

fn render(result: &ConsensusResult, format: OutputFormat, elapsed: Duration) -> String {
    match format {
        OutputFormat::Full => format!(
            "{}{}",
            ConsoleFormatter::format(result),
            ConsoleFormatter::format_summary(result, elapsed)
        ),
        OutputFormat::Consensus => ConsoleFormatter::format_consensus_only(result),
        OutputFormat::Json => format!("{}\n", ConsoleFormatter::format_json(result)),
    }
}
