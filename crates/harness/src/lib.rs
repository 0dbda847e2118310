//! Diagnostic Evaluation Harness
//!
//! This crate evaluates a remote diagnostic-suggestion endpoint against a
//! labeled dataset of clinical protocols. For every case it sends one request,
//! compares the returned ICD-10 codes against the ground truth and aggregates
//! accuracy, recall and latency statistics.
//!
//! ## Architecture
//!
//! - **loader**: Discovers case files and validates each protocol record
//! - **dispatcher**: The `Dispatcher` trait and its HTTP implementation
//! - **classifier**: Pure comparison of a response against ground truth
//! - **coordinator**: Bounded-concurrency fan-out/fan-in over a batch
//! - **aggregator**: Summary statistics over the successful cases
//! - **report**: CSV and JSON artifacts, written atomically
//! - **config**: Explicit per-batch configuration
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use dxeval_harness::{
//!     aggregate, discover_case_files, sources_from_files, Coordinator, HarnessConfig,
//!     HttpDispatcher, ReportWriter,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = HarnessConfig::default().with_parallelism(4);
//!     let dispatcher = HttpDispatcher::new("http://localhost:8000/diagnose", &config)?;
//!     let coordinator = Coordinator::new(Arc::new(dispatcher), config.clone());
//!
//!     let files = discover_case_files(Path::new("./data/test_set"))?;
//!     let outcome = coordinator.run(sources_from_files(files)).await;
//!
//!     if let Some(metrics) = aggregate(&outcome.results, config.top_k) {
//!         ReportWriter::new("data/evals").write("my_submission", &outcome.results, &metrics)?;
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod coordinator;
pub mod dispatcher;
pub mod loader;
pub mod report;

pub use aggregator::aggregate;
pub use classifier::classify;
pub use config::{ConfigError, HarnessConfig};
pub use coordinator::{sources_from_files, CaseSource, Coordinator, NoopObserver, ProgressObserver};
pub use dispatcher::{parse_endpoint, DispatchOutcome, Dispatcher, HttpDispatcher};
pub use loader::{discover_case_files, load_case_file, DatasetDirError};
pub use report::{ReportPaths, ReportWriter};

pub use dxeval_domain as domain;
