mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing::{error, info};

use rawsync_core::{
    load_config, validate_config, AcquisitionPipeline, Config, FsTransferer, Outcome,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration file looked up next to the executable.
const CONFIG_FILE_NAME: &str = "rawsync.conf";

#[derive(Parser)]
#[command(name = "rawsync")]
#[command(about = "Track acquired instrument files and transfer completed sequences")]
#[command(version)]
struct Cli {
    /// Data file whose arrival triggered this run
    trigger: PathBuf,

    /// Expected sequence file names, bypassing the sequence descriptor
    /// (repeatable or comma separated)
    #[arg(short, long = "sequence", value_name = "NAME")]
    sequence: Vec<String>,

    /// Append logs to this file (overrides Log_File)
    #[arg(short, long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Print the outcome as JSON instead of a summary line
    #[arg(long)]
    json: bool,

    /// Configuration file (defaults to rawsync.conf next to the executable)
    #[arg(short, long, env = "RAWSYNC_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,
}

fn default_config_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

fn load(path: &Path) -> Result<Config> {
    let config = load_config(path)
        .with_context(|| format!("Failed to load config from {:?}", path))?;
    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = load(&config_path);

    let debug = cli.debug || config.as_ref().is_ok_and(|c| c.debug);
    let log_file = cli
        .log_file
        .clone()
        .or_else(|| config.as_ref().ok().and_then(|c| c.log_file.clone()));

    if let Err(e) = logging::init(debug, log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {e:#}");
    }

    let json = cli.json;
    match run(cli, config).await {
        Ok(outcome) if json => match serde_json::to_string_pretty(&outcome) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Failed to serialize outcome: {}", e);
                ExitCode::FAILURE
            }
        },
        Ok(outcome) => {
            let summary = outcome.to_string();
            let summary = match outcome {
                Outcome::ControlFileIgnored { .. } => summary.cyan(),
                Outcome::Pending { .. } => summary.yellow(),
                Outcome::Transferred(_) => summary.green().bold(),
            };
            println!("{} {}", "rawsync:".bold(), summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Fatal error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: Result<Config>) -> Result<Outcome> {
    let config = config?;
    info!("rawsync {} processing {}", VERSION, cli.trigger.display());

    let mut pipeline = AcquisitionPipeline::new(config, FsTransferer::with_defaults());
    if !cli.sequence.is_empty() {
        info!("Using sequence override from the command line");
        pipeline = pipeline.with_sequence_override(cli.sequence);
    }

    let outcome = pipeline
        .run(&cli.trigger)
        .await
        .with_context(|| format!("Failed to process {}", cli.trigger.display()))?;

    if let Outcome::Transferred(report) = &outcome {
        info!(
            "Transferred {} file(s), {} bytes, to {} in {} ms",
            report.files_copied,
            report.bytes_copied,
            report.destination.display(),
            report.duration_ms
        );
    }

    Ok(outcome)
}
