//! Printable summary of a finished run.

use std::path::PathBuf;

use serde::Serialize;

use dxeval_domain::SummaryMetrics;
use dxeval_harness::report::{round_to, LATENCY_DECIMALS, PERCENT_DECIMALS};
use dxeval_harness::ReportPaths;

/// What the CLI prints after the artifacts are written
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub submission_name: String,
    pub evaluated: usize,
    pub failed: usize,
    pub top_k: usize,
    pub accuracy_at_1_percent: f64,
    pub recall_at_k_percent: f64,
    pub latency: LatencySummary,
    pub reports: ReportLocations,
}

/// Latency figures in seconds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencySummary {
    pub avg_s: f64,
    pub min_s: f64,
    pub max_s: f64,
    pub p50_s: f64,
    pub p95_s: f64,
    pub p95_method: String,
}

/// Where the artifacts were saved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLocations {
    pub csv: PathBuf,
    pub json: PathBuf,
}

impl RunSummary {
    /// Build a summary with the same rounding as the summary document
    pub fn new(submission_name: &str, failed: usize, metrics: &SummaryMetrics, paths: &ReportPaths) -> Self {
        let latency = &metrics.latency;
        Self {
            submission_name: submission_name.to_string(),
            evaluated: metrics.total,
            failed,
            top_k: metrics.top_k,
            accuracy_at_1_percent: round_to(metrics.accuracy_at_1_percent, PERCENT_DECIMALS),
            recall_at_k_percent: round_to(metrics.recall_at_k_percent, PERCENT_DECIMALS),
            latency: LatencySummary {
                avg_s: round_to(latency.mean, LATENCY_DECIMALS),
                min_s: round_to(latency.min, LATENCY_DECIMALS),
                max_s: round_to(latency.max, LATENCY_DECIMALS),
                p50_s: round_to(latency.p50, LATENCY_DECIMALS),
                p95_s: round_to(latency.p95, LATENCY_DECIMALS),
                p95_method: latency.p95_method.as_str().to_string(),
            },
            reports: ReportLocations {
                csv: paths.csv.clone(),
                json: paths.json.clone(),
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use dxeval_domain::{LatencyStats, PercentileMethod};

    pub(crate) fn sample_summary() -> RunSummary {
        let metrics = SummaryMetrics {
            total: 3,
            top_k: 3,
            accuracy_at_1_percent: 200.0 / 3.0,
            recall_at_k_percent: 100.0,
            latency: LatencyStats {
                mean: 0.2,
                min: 0.1,
                max: 0.3,
                p50: 0.2,
                p95: 0.3,
                p95_method: PercentileMethod::MaxFallback,
            },
        };
        let paths = ReportPaths {
            csv: PathBuf::from("data/evals/run.csv"),
            json: PathBuf::from("data/evals/run.json"),
        };
        RunSummary::new("run", 1, &metrics, &paths)
    }

    #[test]
    fn test_summary_rounding() {
        let summary = sample_summary();
        assert_eq!(summary.accuracy_at_1_percent, 66.67);
        assert_eq!(summary.evaluated, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.latency.p95_method, "max_fallback");
    }
}
