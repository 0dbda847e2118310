//! Labeled evaluation cases.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::{CaseError, CaseResult};

/// One labeled protocol record as stored in the dataset.
///
/// Every field is required. Records may carry additional fields (source file,
/// notes) which are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolRecord {
    /// Protocol identifier, unique within a dataset
    pub protocol_id: String,
    /// Free-form symptom description sent to the endpoint
    pub query: String,
    /// Ground-truth ICD-10 code
    pub gt: String,
    /// Codes accepted for the looser recall criterion
    pub icd_codes: Vec<String>,
}

/// A validated evaluation case. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationCase {
    case_id: String,
    query_text: String,
    ground_truth_code: String,
    valid_codes: BTreeSet<String>,
}

impl EvaluationCase {
    /// Build a case, enforcing `ground_truth_code ∈ valid_codes`.
    pub fn new<I, S>(
        case_id: impl Into<String>,
        query_text: impl Into<String>,
        ground_truth_code: impl Into<String>,
        valid_codes: I,
    ) -> CaseResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let case_id = case_id.into();
        let ground_truth_code = ground_truth_code.into();
        let valid_codes: BTreeSet<String> = valid_codes.into_iter().map(Into::into).collect();

        if !valid_codes.contains(&ground_truth_code) {
            return Err(CaseError::integrity(
                case_id,
                format!("gt '{}' not in icd_codes", ground_truth_code),
            ));
        }

        Ok(Self {
            case_id,
            query_text: query_text.into(),
            ground_truth_code,
            valid_codes,
        })
    }

    /// Validate a raw record. `source` labels the error when validation fails.
    pub fn from_record(record: ProtocolRecord, source: &str) -> CaseResult<Self> {
        let ProtocolRecord {
            protocol_id,
            query,
            gt,
            icd_codes,
        } = record;

        Self::new(protocol_id, query, gt, icd_codes).map_err(|err| match err {
            CaseError::DatasetIntegrity { detail, .. } => CaseError::integrity(source, detail),
            other => other,
        })
    }

    /// Case identifier
    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    /// Query text sent to the endpoint
    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    /// Expected code
    pub fn ground_truth_code(&self) -> &str {
        &self.ground_truth_code
    }

    /// Codes considered acceptable
    pub fn valid_codes(&self) -> &BTreeSet<String> {
        &self.valid_codes
    }

    /// Exact, case-sensitive membership in the valid-code set
    pub fn accepts(&self, code: &str) -> bool {
        self.valid_codes.contains(code)
    }
}
