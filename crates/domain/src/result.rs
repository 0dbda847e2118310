//! Per-case results and the outcome of a whole batch.

use serde::Serialize;

use crate::errors::CaseError;

/// Outcome of one case that completed without error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    /// Case identifier
    pub case_id: String,
    /// Rank-1 prediction equals the ground truth
    pub accuracy_at_1: bool,
    /// Any of the top-k predictions is an accepted code
    pub recall_at_k: bool,
    /// Wall-clock request latency in seconds
    pub latency_seconds: f64,
    /// Expected code
    pub ground_truth_code: String,
    /// Rank-1 code, empty when the endpoint returned nothing
    pub top_prediction: String,
    /// Codes of the top-k predictions by rank
    pub top_k_predictions: Vec<String>,
}

/// A case that ended in error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseFailure {
    /// Case label: protocol id when known, otherwise the source file name
    pub case_id: String,
    /// What went wrong
    pub error: CaseError,
}

/// Everything a batch produced. `results` and `failures` are in completion
/// order; re-sort by `case_id` where input order matters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    /// Successful cases
    pub results: Vec<EvaluationResult>,
    /// Failed cases
    pub failures: Vec<CaseFailure>,
}

impl BatchOutcome {
    /// Number of cases that reached a terminal state
    pub fn total(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    /// No case was processed at all
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// The first `limit` failures plus how many were left out
    pub fn failure_preview(&self, limit: usize) -> (&[CaseFailure], usize) {
        let shown = limit.min(self.failures.len());
        (&self.failures[..shown], self.failures.len() - shown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(id: &str) -> CaseFailure {
        CaseFailure {
            case_id: id.to_string(),
            error: CaseError::Transport("connection refused".to_string()),
        }
    }

    #[test]
    fn test_failure_preview_caps_and_counts() {
        let outcome = BatchOutcome {
            results: vec![],
            failures: (0..8).map(|i| failure(&format!("p{}", i))).collect(),
        };

        let (shown, remaining) = outcome.failure_preview(5);
        assert_eq!(shown.len(), 5);
        assert_eq!(remaining, 3);
        assert_eq!(shown[0].case_id, "p0");
    }

    #[test]
    fn test_failure_preview_with_few_failures() {
        let outcome = BatchOutcome {
            results: vec![],
            failures: vec![failure("p0")],
        };

        let (shown, remaining) = outcome.failure_preview(5);
        assert_eq!(shown.len(), 1);
        assert_eq!(remaining, 0);
    }

    #[test]
    fn test_empty_outcome() {
        let outcome = BatchOutcome::default();
        assert!(outcome.is_empty());
        assert_eq!(outcome.total(), 0);
    }
}
