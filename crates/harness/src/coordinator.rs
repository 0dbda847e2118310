//! Concurrency coordinator.
//!
//! Loads a batch in input order, then fans the cases out to one task each,
//! caps the number of dispatches in flight with a counting semaphore, and
//! fans the per-case outcomes back into a single [`BatchOutcome`]. A failing
//! case never cancels its siblings.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use dxeval_domain::{BatchOutcome, CaseError, CaseFailure, EvaluationCase, EvaluationResult};

use crate::classifier::classify;
use crate::config::HarnessConfig;
use crate::dispatcher::Dispatcher;
use crate::loader::{file_label, load_case_file};

/// Where a case comes from
#[derive(Debug, Clone)]
pub enum CaseSource {
    /// A case file, loaded before any dispatch starts
    File(PathBuf),
    /// An already validated case
    Loaded(EvaluationCase),
}

impl CaseSource {
    /// Label used before the case itself is known
    pub fn label(&self) -> String {
        match self {
            Self::File(path) => file_label(path),
            Self::Loaded(case) => case.case_id().to_string(),
        }
    }

    async fn resolve(self) -> Result<EvaluationCase, CaseError> {
        match self {
            Self::File(path) => load_case_file(&path).await,
            Self::Loaded(case) => Ok(case),
        }
    }
}

impl From<PathBuf> for CaseSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<EvaluationCase> for CaseSource {
    fn from(case: EvaluationCase) -> Self {
        Self::Loaded(case)
    }
}

/// Advisory progress hooks. Called from worker tasks, so implementations must
/// be cheap and thread-safe.
pub trait ProgressObserver: Send + Sync {
    /// The batch is about to start with `total` cases
    fn on_batch_start(&self, _total: usize) {}

    /// A case reached a terminal state
    fn on_case_finished(&self, _case_id: &str, _succeeded: bool) {}

    /// Every case reached a terminal state
    fn on_batch_finish(&self, _outcome: &BatchOutcome) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}

/// Runs a batch of cases against one dispatcher
#[derive(Clone)]
pub struct Coordinator {
    dispatcher: Arc<dyn Dispatcher>,
    config: HarnessConfig,
}

impl Coordinator {
    /// Create a coordinator. `config` is expected to be validated.
    pub fn new(dispatcher: Arc<dyn Dispatcher>, config: HarnessConfig) -> Self {
        Self { dispatcher, config }
    }

    /// Run a batch without progress reporting
    pub async fn run(&self, cases: Vec<CaseSource>) -> BatchOutcome {
        self.run_with_observer(cases, Arc::new(NoopObserver)).await
    }

    /// Run a batch, reporting progress to `observer`.
    ///
    /// Cases are loaded first, in input order, so a repeated `protocol_id`
    /// always fails on every occurrence after the first. Returns once every
    /// case is either in `results` or in `failures`.
    pub async fn run_with_observer(
        &self,
        cases: Vec<CaseSource>,
        observer: Arc<dyn ProgressObserver>,
    ) -> BatchOutcome {
        let total = cases.len();
        if total == 0 {
            return BatchOutcome::default();
        }

        let parallelism = self.config.parallelism.max(1);
        info!(
            cases = total,
            parallelism,
            top_k = self.config.top_k,
            "Starting evaluation batch"
        );
        observer.on_batch_start(total);

        let state = Arc::new(Mutex::new(BatchOutcome::default()));
        let ready = self
            .load_unique(cases, parallelism, &state, observer.as_ref())
            .await;

        let limiter = Arc::new(Semaphore::new(parallelism));
        let (labels, handles): (Vec<String>, Vec<_>) = ready
            .into_iter()
            .map(|case| {
                let label = case.case_id().to_string();
                let task = CaseTask {
                    dispatcher: Arc::clone(&self.dispatcher),
                    limiter: Arc::clone(&limiter),
                    state: Arc::clone(&state),
                    observer: Arc::clone(&observer),
                    top_k: self.config.top_k,
                };
                (label, tokio::spawn(task.run(case)))
            })
            .unzip();

        for (label, joined) in labels.into_iter().zip(join_all(handles).await) {
            if let Err(join_err) = joined {
                // The task died before recording anything; record it here so
                // no case goes missing.
                warn!(case = %label, error = %join_err, "Evaluation task aborted");
                record_failure(
                    &state,
                    observer.as_ref(),
                    CaseFailure {
                        case_id: label,
                        error: CaseError::Aborted(join_err.to_string()),
                    },
                );
            }
        }

        let outcome = std::mem::take(&mut *state.lock());

        info!(
            succeeded = outcome.results.len(),
            failed = outcome.failures.len(),
            "Evaluation batch finished"
        );
        observer.on_batch_finish(&outcome);

        outcome
    }

    /// Load every source with at most `parallelism` reads in flight and keep
    /// the first case per `protocol_id`, in input order. Everything else is
    /// recorded as a failure.
    async fn load_unique(
        &self,
        cases: Vec<CaseSource>,
        parallelism: usize,
        state: &Mutex<BatchOutcome>,
        observer: &dyn ProgressObserver,
    ) -> Vec<EvaluationCase> {
        let loaded: Vec<(String, Result<EvaluationCase, CaseError>)> = stream::iter(cases)
            .map(|source| async move {
                let label = source.label();
                let case = source.resolve().await;
                (label, case)
            })
            .buffered(parallelism)
            .collect()
            .await;

        let mut claimed = HashSet::new();
        let mut ready = Vec::with_capacity(loaded.len());
        for (label, case) in loaded {
            let error = match case {
                Ok(case) => {
                    if claimed.insert(case.case_id().to_string()) {
                        ready.push(case);
                        continue;
                    }
                    CaseError::integrity(
                        label.as_str(),
                        format!("duplicate protocol_id '{}'", case.case_id()),
                    )
                }
                Err(error) => error,
            };
            record_failure(
                state,
                observer,
                CaseFailure {
                    case_id: label,
                    error,
                },
            );
        }
        ready
    }
}

fn record_failure(state: &Mutex<BatchOutcome>, observer: &dyn ProgressObserver, failure: CaseFailure) {
    warn!(
        case = %failure.case_id,
        code = failure.error.error_code(),
        error = %failure.error,
        "Case failed"
    );
    let case_id = failure.case_id.clone();
    state.lock().failures.push(failure);
    observer.on_case_finished(&case_id, false);
}

/// Everything one case's task needs
struct CaseTask {
    dispatcher: Arc<dyn Dispatcher>,
    limiter: Arc<Semaphore>,
    state: Arc<Mutex<BatchOutcome>>,
    observer: Arc<dyn ProgressObserver>,
    top_k: usize,
}

impl CaseTask {
    async fn run(self, case: EvaluationCase) {
        match self.evaluate(&case).await {
            Ok(result) => {
                self.state.lock().results.push(result);
                self.observer.on_case_finished(case.case_id(), true);
            }
            Err(error) => record_failure(
                &self.state,
                self.observer.as_ref(),
                CaseFailure {
                    case_id: case.case_id().to_string(),
                    error,
                },
            ),
        }
    }

    async fn evaluate(&self, case: &EvaluationCase) -> Result<EvaluationResult, CaseError> {
        // The permit is released when it drops, on every exit path.
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|e| CaseError::Aborted(e.to_string()))?;

        let dispatched = self.dispatcher.dispatch(case).await?;

        debug!(
            case = %case.case_id(),
            latency_s = dispatched.latency.as_secs_f64(),
            predictions = dispatched.response.diagnoses.len(),
            "Case dispatched"
        );

        Ok(classify(case, &dispatched.response, dispatched.latency, self.top_k))
    }
}

/// Wrap case files as sources
pub fn sources_from_files(paths: Vec<PathBuf>) -> Vec<CaseSource> {
    paths.into_iter().map(CaseSource::File).collect()
}
