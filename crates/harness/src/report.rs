//! Report writing.
//!
//! Two artifacts per run, both named after the submission:
//!
//! - `<name>.csv`: one row per successful case
//! - `<name>.json`: the summary metrics document
//!
//! Each artifact is written to a temporary file in the destination directory
//! and renamed into place, so a reader never sees a truncated file under the
//! final name.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use dxeval_domain::{EvaluationResult, SummaryMetrics};

/// Default output directory, relative to the working directory
pub const DEFAULT_OUTPUT_DIR: &str = "data/evals";

/// Decimal places for percentages
pub const PERCENT_DECIMALS: i32 = 2;

/// Decimal places for latencies
pub const LATENCY_DECIMALS: i32 = 3;

/// Locations of the written artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    /// Per-case table
    pub csv: PathBuf,
    /// Summary document
    pub json: PathBuf,
}

/// Writes both artifacts into one directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    /// Writer targeting `output_dir` (created on first write)
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Destination directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Paths the artifacts for `submission_name` will be written to
    pub fn paths_for(&self, submission_name: &str) -> ReportPaths {
        ReportPaths {
            csv: self.output_dir.join(format!("{}.csv", submission_name)),
            json: self.output_dir.join(format!("{}.json", submission_name)),
        }
    }

    /// Write the per-case table and the summary document
    pub fn write(
        &self,
        submission_name: &str,
        results: &[EvaluationResult],
        metrics: &SummaryMetrics,
    ) -> Result<ReportPaths> {
        validate_submission_name(submission_name)?;

        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create directory: {}", self.output_dir.display())
        })?;

        let paths = self.paths_for(submission_name);

        let table = results_csv(results, metrics.top_k)?;
        write_atomic(&paths.csv, &table)?;

        let document = summary_document(submission_name, metrics, Utc::now());
        let mut json = serde_json::to_vec_pretty(&document)
            .context("Failed to serialize summary document")?;
        json.push(b'\n');
        write_atomic(&paths.json, &json)?;

        tracing::info!(
            csv = %paths.csv.display(),
            json = %paths.json.display(),
            rows = results.len(),
            "Reports written"
        );

        Ok(paths)
    }
}

/// Reject names that are empty or would escape the output directory
pub fn validate_submission_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("Submission name must not be empty");
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        anyhow::bail!("Submission name '{}' must be a plain file name", name);
    }
    Ok(())
}

/// Round to `decimals` places.
///
/// Scales, rounds the binary value half away from zero, and scales back. A
/// decimal tie that is not exactly representable rounds by its binary value,
/// so `1.0005` (stored just below the tie) becomes `1.0`.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Render the per-case table. Rows are sorted by case id.
pub fn results_csv(results: &[EvaluationResult], top_k: usize) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record([
        "protocol_id".to_string(),
        "accuracy_at_1".to_string(),
        format!("recall_at_{}", top_k),
        "latency_s".to_string(),
        "ground_truth".to_string(),
        "top_prediction".to_string(),
        format!("top_{}_predictions", top_k),
    ])?;

    let mut sorted: Vec<&EvaluationResult> = results.iter().collect();
    sorted.sort_by(|a, b| a.case_id.cmp(&b.case_id));

    for r in sorted {
        writer.write_record([
            r.case_id.clone(),
            flag(r.accuracy_at_1).to_string(),
            flag(r.recall_at_k).to_string(),
            format!("{:.3}", r.latency_seconds),
            r.ground_truth_code.clone(),
            r.top_prediction.clone(),
            r.top_k_predictions.join(";"),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e))
}

fn flag(value: bool) -> u8 {
    u8::from(value)
}

/// Build the summary document with presentation rounding applied
pub fn summary_document(
    submission_name: &str,
    metrics: &SummaryMetrics,
    generated_at: DateTime<Utc>,
) -> Value {
    let latency = &metrics.latency;
    let mut doc = Map::new();

    doc.insert("submission_name".into(), Value::from(submission_name));
    doc.insert(
        "generated_at".into(),
        Value::from(generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
    );
    doc.insert("total_protocols".into(), Value::from(metrics.total));
    doc.insert(
        "accuracy_at_1_percent".into(),
        Value::from(round_to(metrics.accuracy_at_1_percent, PERCENT_DECIMALS)),
    );
    doc.insert(
        format!("recall_at_{}_percent", metrics.top_k),
        Value::from(round_to(metrics.recall_at_k_percent, PERCENT_DECIMALS)),
    );
    for (key, value) in [
        ("latency_avg_s", latency.mean),
        ("latency_min_s", latency.min),
        ("latency_max_s", latency.max),
        ("latency_p50_s", latency.p50),
        ("latency_p95_s", latency.p95),
    ] {
        doc.insert(key.into(), Value::from(round_to(value, LATENCY_DECIMALS)));
    }
    doc.insert(
        "latency_p95_method".into(),
        Value::from(latency.p95_method.as_str()),
    );

    Value::Object(doc)
}

/// Write `contents` to `path` through a temporary sibling file and a rename
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in: {}", dir.display()))?;
    temp.write_all(contents)
        .with_context(|| format!("Failed to write temporary file for: {}", path.display()))?;
    temp.as_file()
        .sync_all()
        .with_context(|| format!("Failed to sync temporary file for: {}", path.display()))?;
    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to move report into place: {}", path.display()))?;

    Ok(())
}
