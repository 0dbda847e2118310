//! Builders for endpoint responses.

use dxeval_domain::{DiagnosticResponse, RankedDiagnosis};

/// Builder for endpoint responses, ranked in insertion order
#[derive(Clone, Default)]
pub struct ResponseBuilder {
    codes: Vec<String>,
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `code` at the next rank
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.codes.push(code.into());
        self
    }

    pub fn build(self) -> DiagnosticResponse {
        DiagnosticResponse {
            diagnoses: self
                .codes
                .into_iter()
                .enumerate()
                .map(|(i, code)| RankedDiagnosis {
                    rank: i as u32 + 1,
                    diagnosis: format!("Simulated diagnosis for {}", code),
                    icd10_code: code,
                    explanation: "Based on reported symptoms".to_string(),
                })
                .collect(),
        }
    }
}
