//! Diagnostic Evaluation Domain Types
//!
//! This crate provides the data model shared by the evaluation harness and the
//! command-line tool. It carries no I/O: cases, endpoint responses, per-case
//! results and the aggregate metrics are plain strongly-typed values.
//!
//! ## Architecture
//!
//! - **case**: Labeled evaluation cases and the raw protocol record they are read from
//! - **response**: Request/response contract of the diagnostic endpoint
//! - **result**: Per-case results, per-case failures and the batch outcome
//! - **metrics**: Summary statistics over a batch
//! - **errors**: The per-case error taxonomy
//!
//! ## Usage
//!
//! ```rust
//! use dxeval_domain::case::EvaluationCase;
//!
//! let case = EvaluationCase::new(
//!     "protocol-001",
//!     "fever and cough for three days",
//!     "J06",
//!     ["J06", "J00"],
//! )
//! .unwrap();
//!
//! assert!(case.accepts("J00"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod case;
pub mod errors;
pub mod metrics;
pub mod response;
pub mod result;

pub use case::{EvaluationCase, ProtocolRecord};
pub use errors::{CaseError, CaseResult};
pub use metrics::{LatencyStats, PercentileMethod, SummaryMetrics};
pub use response::{DiagnosticRequest, DiagnosticResponse, RankedDiagnosis};
pub use result::{BatchOutcome, CaseFailure, EvaluationResult};
