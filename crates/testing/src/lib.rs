//! Testing utilities for the diagnostic evaluation harness
//!
//! This crate provides:
//! - Fixtures for protocol records, cases and endpoint bodies
//! - Builders for endpoint responses with explicit ranks
//! - A scripted in-memory dispatcher that tracks concurrency
//! - Helpers mounting a fake diagnostic endpoint on a `wiremock` server
//!
//! # Examples
//!
//! ```
//! use dxeval_testing::fixtures::*;
//!
//! let case = test_case("p1", "A00", &["A00", "A01"]);
//! assert_eq!(case.case_id(), "p1");
//!
//! let body = diagnoses_body(&["A00", "B00"]);
//! assert_eq!(body["diagnoses"][0]["rank"], 1);
//! ```

pub mod builders;
pub mod fixtures;
pub mod mocks;

// Re-export commonly used types
pub use builders::*;
pub use fixtures::*;
pub use mocks::*;

// Re-export testing dependencies for convenience
pub use fake;
pub use tempfile;
pub use wiremock;
