//! Metrics aggregation.
//!
//! Order-independent: only sums and sorted statistics are used, so any
//! permutation of the same results yields the same metrics.

use std::cmp::Ordering;

use dxeval_domain::{EvaluationResult, LatencyStats, PercentileMethod, SummaryMetrics};

/// Below this many samples p95 falls back to the maximum
pub const MIN_SAMPLES_FOR_P95: usize = 4;

/// Reduce results to summary metrics. `None` when there is nothing to
/// aggregate; callers must check before rendering.
pub fn aggregate(results: &[EvaluationResult], top_k: usize) -> Option<SummaryMetrics> {
    if results.is_empty() {
        return None;
    }

    let total = results.len();
    let accuracy_hits = results.iter().filter(|r| r.accuracy_at_1).count();
    let recall_hits = results.iter().filter(|r| r.recall_at_k).count();

    let latencies: Vec<f64> = results.iter().map(|r| r.latency_seconds).collect();
    let latency = latency_stats(&latencies)?;

    Some(SummaryMetrics {
        total,
        top_k,
        accuracy_at_1_percent: percent(accuracy_hits, total),
        recall_at_k_percent: percent(recall_hits, total),
        latency,
    })
}

fn percent(hits: usize, total: usize) -> f64 {
    hits as f64 / total as f64 * 100.0
}

/// Latency distribution of a non-empty sample
pub fn latency_stats(latencies: &[f64]) -> Option<LatencyStats> {
    if latencies.is_empty() {
        return None;
    }

    let mut sorted = latencies.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let n = sorted.len();
    let min = sorted[0];
    let max = sorted[n - 1];
    let mean = sorted.iter().sum::<f64>() / n as f64;

    let (p95, p95_method) = if n >= MIN_SAMPLES_FOR_P95 {
        (
            interpolated_percentile(&sorted, 0.95),
            PercentileMethod::LinearInterpolation,
        )
    } else {
        (max, PercentileMethod::MaxFallback)
    };

    Some(LatencyStats {
        mean,
        min,
        max,
        p50: median(&sorted),
        p95,
        p95_method,
    })
}

/// Exact middle, or the mean of the two middles for an even count.
/// `sorted` must be non-empty and ascending.
fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Linear interpolation between closest ranks (Hyndman-Fan type 7).
/// `sorted` must be non-empty and ascending; `p` in `[0, 1]`.
fn interpolated_percentile(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lower = h.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let fraction = h - lower as f64;

    sorted[lower] + fraction * (sorted[upper] - sorted[lower])
}
