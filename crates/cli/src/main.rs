//! Diagnostic evaluation CLI
//!
//! Runs a dataset of protocol cases against a diagnostic endpoint and writes
//! accuracy, recall and latency reports.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use colored::Colorize;

use dxeval_cli::commands::evaluate::{self, EvaluateArgs};
use dxeval_cli::commands::{CommandContext, CommandError};
use dxeval_cli::config::Config;
use dxeval_cli::output::OutputFormat;
use dxeval_cli::telemetry;

/// Output format for CLI commands
#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum CliOutputFormat {
    /// JSON output
    Json,
    /// Table output (default)
    #[default]
    Table,
    /// Plain text output
    Plain,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::Table => OutputFormat::Table,
            CliOutputFormat::Plain => OutputFormat::Plain,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "dxeval")]
#[command(author, version, about = "Evaluate a diagnostic suggestion endpoint")]
#[command(long_about = "Sends every protocol case of a dataset directory to a diagnostic endpoint,\n\
    scores accuracy@1 and recall@k, and writes a per-case CSV plus a summary JSON.")]
struct Cli {
    /// Submission name, used for the report file names
    #[arg(short, long)]
    name: String,

    /// Diagnostic endpoint URL
    #[arg(short, long)]
    endpoint: String,

    /// Directory of protocol case files (*.json)
    #[arg(short, long)]
    dataset_dir: PathBuf,

    /// Maximum concurrent requests
    #[arg(short, long)]
    parallelism: Option<usize>,

    /// Directory receiving the reports
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Number of top predictions counted for recall
    #[arg(long)]
    top_k: Option<usize>,

    /// Configuration file (defaults to ~/.dxeval/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    format: CliOutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = telemetry::init_tracing(cli.log_json, cli.verbose) {
        eprintln!("{} {}", "Warning:".yellow().bold(), e);
    }

    let verbose = cli.verbose;
    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if verbose {
            eprintln!("\n{}", "Details:".dimmed());
            eprintln!("{:?}", e);
        }
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    let config = Config::load(cli.config.as_deref())?;
    if !config.colored {
        colored::control::set_override(false);
    }

    let ctx = CommandContext::new(config, cli.format.into(), !cli.no_progress);
    let args = EvaluateArgs {
        name: cli.name,
        endpoint: cli.endpoint,
        dataset_dir: cli.dataset_dir,
        parallelism: cli.parallelism,
        output_dir: cli.output_dir,
        timeout_seconds: cli.timeout,
        top_k: cli.top_k,
    };

    let status = evaluate::execute(&ctx, args).await?;
    tracing::debug!(?status, "Evaluation finished");

    Ok(())
}
