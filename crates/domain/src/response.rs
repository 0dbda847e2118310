//! Request/response contract of the diagnostic endpoint.

use serde::{Deserialize, Serialize};

use crate::errors::{CaseError, CaseResult};

/// Body of the outbound `POST` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRequest {
    /// Symptom description (the case query)
    pub symptoms: String,
}

/// One ranked prediction returned by the endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedDiagnosis {
    /// 1-based rank
    pub rank: u32,
    /// Predicted ICD-10 code
    pub icd10_code: String,
    /// Human-readable diagnosis name
    pub diagnosis: String,
    /// Model explanation for the prediction
    pub explanation: String,
}

/// Successful endpoint response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticResponse {
    /// Predictions, in whatever order the endpoint chose
    pub diagnoses: Vec<RankedDiagnosis>,
}

impl DiagnosticResponse {
    /// Parse and validate a raw response body.
    ///
    /// Any deviation from the contract (missing field, wrong type, rank 0)
    /// is a [`CaseError::ResponseParse`].
    pub fn from_slice(body: &[u8]) -> CaseResult<Self> {
        let response: Self = serde_json::from_slice(body)
            .map_err(|e| CaseError::ResponseParse(e.to_string()))?;
        response.validate()?;
        Ok(response)
    }

    /// Check rank invariants
    pub fn validate(&self) -> CaseResult<()> {
        if let Some(bad) = self.diagnoses.iter().find(|d| d.rank == 0) {
            return Err(CaseError::ResponseParse(format!(
                "rank must be >= 1, got 0 for code '{}'",
                bad.icd10_code
            )));
        }
        Ok(())
    }

    /// Predictions sorted ascending by rank. The sort is stable, so tied
    /// ranks keep the endpoint's order.
    pub fn ranked(&self) -> Vec<&RankedDiagnosis> {
        let mut ranked: Vec<&RankedDiagnosis> = self.diagnoses.iter().collect();
        ranked.sort_by_key(|d| d.rank);
        ranked
    }

    /// Rank-1 code, or an empty string when there are no predictions
    pub fn top_prediction(&self) -> String {
        self.ranked()
            .first()
            .map(|d| d.icd10_code.clone())
            .unwrap_or_default()
    }

    /// Codes of the first `k` predictions by rank
    pub fn top_k(&self, k: usize) -> Vec<String> {
        self.ranked()
            .into_iter()
            .take(k)
            .map(|d| d.icd10_code.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn diagnosis(rank: u32, code: &str) -> serde_json::Value {
        json!({
            "rank": rank,
            "icd10_code": code,
            "diagnosis": format!("Diagnosis {}", code),
            "explanation": "matches reported symptoms"
        })
    }

    #[test]
    fn test_predictions_are_ordered_by_rank() {
        let body = json!({
            "diagnoses": [diagnosis(3, "C00"), diagnosis(1, "A00"), diagnosis(2, "B00"), diagnosis(4, "D00")]
        });
        let response = DiagnosticResponse::from_slice(body.to_string().as_bytes()).unwrap();

        assert_eq!(response.top_prediction(), "A00");
        assert_eq!(response.top_k(3), vec!["A00", "B00", "C00"]);
    }

    #[test]
    fn test_empty_predictions() {
        let response = DiagnosticResponse::from_slice(br#"{"diagnoses": []}"#).unwrap();

        assert_eq!(response.top_prediction(), "");
        assert!(response.top_k(3).is_empty());
    }

    #[test]
    fn test_shape_mismatch_is_parse_error() {
        let cases: [&[u8]; 4] = [
            b"not json",
            br#"{"results": []}"#,
            br#"{"diagnoses": [{"rank": "1", "icd10_code": "A00", "diagnosis": "x", "explanation": "y"}]}"#,
            br#"{"diagnoses": [{"rank": 1, "diagnosis": "x", "explanation": "y"}]}"#,
        ];

        for body in cases {
            let err = DiagnosticResponse::from_slice(body).unwrap_err();
            assert_eq!(err.error_code(), "RESPONSE_PARSE");
        }
    }

    #[test]
    fn test_rank_zero_is_rejected() {
        let body = json!({ "diagnoses": [diagnosis(0, "A00")] });
        let err = DiagnosticResponse::from_slice(body.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, CaseError::ResponseParse(_)));
    }

    #[test]
    fn test_request_body_shape() {
        let request = DiagnosticRequest {
            symptoms: "headache".to_string(),
        };
        assert_eq!(serde_json::to_value(&request).unwrap(), json!({"symptoms": "headache"}));
    }

    proptest::proptest! {
        #[test]
        fn prop_top_k_is_rank_prefix(
            ranks in proptest::collection::vec(1u32..20, 0..12),
            k in 0usize..15,
        ) {
            let response = DiagnosticResponse {
                diagnoses: ranks
                    .iter()
                    .enumerate()
                    .map(|(i, rank)| RankedDiagnosis {
                        rank: *rank,
                        icd10_code: format!("C{:02}", i),
                        diagnosis: String::new(),
                        explanation: String::new(),
                    })
                    .collect(),
            };

            let ranked = response.ranked();
            proptest::prop_assert!(ranked.windows(2).all(|w| w[0].rank <= w[1].rank));

            let top = response.top_k(k);
            proptest::prop_assert_eq!(top.len(), k.min(ranks.len()));
            let prefix: Vec<String> = ranked.iter().take(k).map(|d| d.icd10_code.clone()).collect();
            proptest::prop_assert_eq!(top, prefix);
        }
    }
}
