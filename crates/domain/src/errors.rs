//! Error types for a single evaluation case.
//!
//! Every failure that can happen while evaluating one case is captured by
//! [`CaseError`]. None of them aborts a batch: the coordinator records them
//! next to the case they belong to and carries on with the siblings.

use serde::Serialize;

/// Result alias for per-case operations
pub type CaseResult<T> = std::result::Result<T, CaseError>;

/// Per-case error taxonomy
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaseError {
    /// The labeled record contradicts itself (ground truth outside the valid set,
    /// duplicate identifier). A defect in the dataset, never tolerated.
    #[error("Dataset integrity error in {case}: {detail}")]
    DatasetIntegrity {
        /// Case label (protocol id or file name)
        case: String,
        /// What is inconsistent
        detail: String,
    },

    /// The record could not be read or required fields are missing or mistyped
    #[error("Malformed case {case}: {detail}")]
    MalformedCase {
        /// Case label (protocol id or file name)
        case: String,
        /// Parser or I/O message
        detail: String,
    },

    /// Network failure or timeout reaching the endpoint
    #[error("Transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status
    #[error("Endpoint returned HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Truncated response body
        body: String,
    },

    /// The endpoint body does not match the expected response shape
    #[error("Unexpected response shape: {0}")]
    ResponseParse(String),

    /// The task evaluating the case terminated abnormally
    #[error("Evaluation task aborted: {0}")]
    Aborted(String),
}

impl CaseError {
    /// Stable machine-readable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DatasetIntegrity { .. } => "DATASET_INTEGRITY",
            Self::MalformedCase { .. } => "MALFORMED_CASE",
            Self::Transport(_) => "TRANSPORT",
            Self::HttpStatus { .. } => "HTTP_STATUS",
            Self::ResponseParse(_) => "RESPONSE_PARSE",
            Self::Aborted(_) => "ABORTED",
        }
    }

    /// Whether the error points at the input dataset rather than the endpoint
    pub fn is_dataset_error(&self) -> bool {
        matches!(
            self,
            Self::DatasetIntegrity { .. } | Self::MalformedCase { .. }
        )
    }

    /// Shorthand for a [`CaseError::DatasetIntegrity`]
    pub fn integrity(case: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::DatasetIntegrity {
            case: case.into(),
            detail: detail.into(),
        }
    }

    /// Shorthand for a [`CaseError::MalformedCase`]
    pub fn malformed(case: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MalformedCase {
            case: case.into(),
            detail: detail.into(),
        }
    }
}

/// Serialized form used in machine-readable error listings
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    dataset_error: bool,
}

impl Serialize for CaseError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ErrorBody {
            code: self.error_code(),
            message: self.to_string(),
            dataset_error: self.is_dataset_error(),
        }
        .serialize(serializer)
    }
}
