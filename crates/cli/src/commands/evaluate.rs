//! Evaluate command
//!
//! Runs every case of a dataset directory against a diagnostic endpoint and
//! writes the per-case table and summary document.

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;

use dxeval_domain::BatchOutcome;
use dxeval_harness::report::validate_submission_name;
use dxeval_harness::{
    aggregate, discover_case_files, sources_from_files, Coordinator, HarnessConfig, HttpDispatcher,
    ReportWriter,
};

use super::{CommandContext, CommandError};
use crate::config::Config;
use crate::output::{colors, render_summary, ProgressReporter, RunSummary, TableFormatter};

/// Arguments of one evaluation run. `None` falls back to the configuration.
#[derive(Debug, Clone, Default)]
pub struct EvaluateArgs {
    pub name: String,
    pub endpoint: String,
    pub dataset_dir: PathBuf,
    pub parallelism: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub timeout_seconds: Option<u64>,
    pub top_k: Option<usize>,
}

impl EvaluateArgs {
    /// Configuration with command-line overrides applied
    pub fn settings(&self, config: &Config) -> Config {
        let mut settings = config.clone();
        if let Some(parallelism) = self.parallelism {
            settings.parallelism = parallelism;
        }
        if let Some(output_dir) = &self.output_dir {
            settings.output_dir = output_dir.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            settings.timeout_seconds = timeout;
        }
        if let Some(top_k) = self.top_k {
            settings.top_k = top_k;
        }
        settings
    }
}

/// How a run ended, short of an error
#[derive(Debug)]
pub enum EvaluateStatus {
    /// The dataset directory held no case files
    NoCases,
    /// Every case failed; nothing was written
    NoResults { failed: usize },
    /// Reports were written
    Completed(RunSummary),
}

/// Run an evaluation
pub async fn execute(ctx: &CommandContext, args: EvaluateArgs) -> Result<EvaluateStatus, CommandError> {
    let settings = args.settings(&ctx.config);
    let harness = settings.harness_config()?;
    validate_submission_name(&args.name)?;

    let files = discover_case_files(&args.dataset_dir)?;
    if files.is_empty() {
        ctx.say(colors::warning(&format!(
            "No JSON files found in {}",
            args.dataset_dir.display()
        )));
        return Ok(EvaluateStatus::NoCases);
    }

    // Validated before the first request is sent
    let dispatcher = HttpDispatcher::new(&args.endpoint, &harness)?;

    print_panel(ctx, &args, &settings, &harness, files.len())?;

    let progress = Arc::new(ProgressReporter::new(
        ctx.show_progress && !ctx.format.is_machine_readable(),
    ));
    let coordinator = Coordinator::new(Arc::new(dispatcher), harness.clone());
    let outcome = coordinator
        .run_with_observer(sources_from_files(files), progress)
        .await;

    print_failures(ctx, &outcome, settings.error_preview_limit);

    let Some(metrics) = aggregate(&outcome.results, harness.top_k) else {
        ctx.say(colors::error("No successful evaluations; no reports written"));
        return Ok(EvaluateStatus::NoResults {
            failed: outcome.failures.len(),
        });
    };

    let paths = ReportWriter::new(&settings.output_dir).write(&args.name, &outcome.results, &metrics)?;

    let summary = RunSummary::new(&args.name, outcome.failures.len(), &metrics, &paths);
    ctx.say(colors::success(&format!(
        "Evaluated {} of {} case(s)",
        summary.evaluated,
        outcome.total()
    )));
    println!("{}", render_summary(&summary, ctx.format)?);

    Ok(EvaluateStatus::Completed(summary))
}

fn print_panel(
    ctx: &CommandContext,
    args: &EvaluateArgs,
    settings: &Config,
    harness: &HarnessConfig,
    cases: usize,
) -> anyhow::Result<()> {
    ctx.say(colors::info("Diagnostic Evaluation").bold());
    ctx.say(TableFormatter::key_value(vec![
        ("Submission", args.name.clone()),
        ("Endpoint", args.endpoint.clone()),
        ("Dataset", args.dataset_dir.display().to_string()),
        ("Cases", cases.to_string()),
        ("Parallelism", harness.parallelism.to_string()),
        ("Timeout", format!("{}s", harness.request_timeout.as_secs())),
        ("Top-k", harness.top_k.to_string()),
        ("Output", settings.output_dir.display().to_string()),
        ("Format", ctx.format.to_string()),
    ])?);
    Ok(())
}

fn print_failures(ctx: &CommandContext, outcome: &BatchOutcome, limit: usize) {
    if outcome.failures.is_empty() {
        return;
    }

    ctx.say(format!(
        "{} {} of {} case(s) failed",
        colors::warning("!"),
        outcome.failures.len(),
        outcome.total()
    ));

    let (shown, remaining) = outcome.failure_preview(limit);
    for failure in shown {
        ctx.say(format!(
            "  - {}: {}",
            colors::bold(&failure.case_id),
            failure.error
        ));
    }
    if remaining > 0 {
        ctx.say(colors::dim(&format!("  ... and {} more", remaining)));
    }
}
