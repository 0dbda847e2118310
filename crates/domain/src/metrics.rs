//! Summary statistics over a batch of results.
//!
//! Values are kept at full precision. Rounding is a presentation concern and
//! happens only when a report is rendered.

use serde::Serialize;

/// How the 95th percentile latency was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentileMethod {
    /// Linear interpolation between closest ranks, `h = (n - 1) * p`
    LinearInterpolation,
    /// Fewer than four samples: the maximum stands in for p95
    MaxFallback,
}

impl PercentileMethod {
    /// Stable name written into reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LinearInterpolation => "linear_interpolation",
            Self::MaxFallback => "max_fallback",
        }
    }
}

/// Latency distribution in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencyStats {
    /// Arithmetic mean
    pub mean: f64,
    /// Fastest request
    pub min: f64,
    /// Slowest request
    pub max: f64,
    /// Median (mean of the two middles for an even count)
    pub p50: f64,
    /// 95th percentile
    pub p95: f64,
    /// Method used for `p95`
    pub p95_method: PercentileMethod,
}

/// Aggregate metrics for a non-empty set of results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    /// Number of successful cases aggregated
    pub total: usize,
    /// Cut-off used for recall@k
    pub top_k: usize,
    /// 100 × mean(accuracy@1)
    pub accuracy_at_1_percent: f64,
    /// 100 × mean(recall@k)
    pub recall_at_k_percent: f64,
    /// Latency distribution
    pub latency: LatencyStats,
}
