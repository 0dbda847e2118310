//! Outcome classification. Pure, no I/O.

use std::time::Duration;

use dxeval_domain::{DiagnosticResponse, EvaluationCase, EvaluationResult};

/// Compare a response against the case's ground truth.
///
/// - accuracy@1: the rank-1 code equals the ground truth exactly
/// - recall@k: any of the first `top_k` codes is in the valid-code set,
///   which is looser than matching the ground truth itself
///
/// Codes are compared as-is, without case folding or trimming.
pub fn classify(
    case: &EvaluationCase,
    response: &DiagnosticResponse,
    latency: Duration,
    top_k: usize,
) -> EvaluationResult {
    let top_prediction = response.top_prediction();
    let top_k_predictions = response.top_k(top_k);

    let accuracy_at_1 = top_prediction == case.ground_truth_code();
    let recall_at_k = top_k_predictions.iter().any(|code| case.accepts(code));

    EvaluationResult {
        case_id: case.case_id().to_string(),
        accuracy_at_1,
        recall_at_k,
        latency_seconds: latency.as_secs_f64(),
        ground_truth_code: case.ground_truth_code().to_string(),
        top_prediction,
        top_k_predictions,
    }
}
