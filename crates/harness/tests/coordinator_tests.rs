//! Integration tests for the concurrency coordinator
//!
//! Uses the scripted in-memory dispatcher from `dxeval-testing`, so no
//! network is involved.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dxeval_domain::{BatchOutcome, CaseError};
use dxeval_harness::{aggregate, sources_from_files, CaseSource, Coordinator, HarnessConfig, ProgressObserver};
use dxeval_testing::{protocol_json, test_case, write_case_file, write_protocol, Script, ScriptedDispatcher};

fn coordinator(dispatcher: Arc<ScriptedDispatcher>, parallelism: usize) -> Coordinator {
    Coordinator::new(dispatcher, HarnessConfig::default().with_parallelism(parallelism))
}

fn loaded(ids: &[&str]) -> Vec<CaseSource> {
    ids.iter()
        .map(|id| CaseSource::from(test_case(id, "A00", &["A00", "A01"])))
        .collect()
}

fn sorted_ids(outcome: &BatchOutcome) -> Vec<String> {
    let mut ids: Vec<String> = outcome
        .results
        .iter()
        .map(|r| r.case_id.clone())
        .chain(outcome.failures.iter().map(|f| f.case_id.clone()))
        .collect();
    ids.sort();
    ids
}

// ============================================================================
// Batch accounting
// ============================================================================

#[tokio::test]
async fn test_empty_batch() {
    let dispatcher = Arc::new(ScriptedDispatcher::new());
    let outcome = coordinator(Arc::clone(&dispatcher), 2).run(Vec::new()).await;

    assert!(outcome.is_empty());
    assert_eq!(dispatcher.call_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_case_accounted_for_any_parallelism() {
    let ids: Vec<String> = (0..12).map(|i| format!("p{:02}", i)).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();

    for parallelism in [1, 2, 5, 12, 50] {
        let dispatcher = Arc::new(
            ScriptedDispatcher::new()
                .with_default_delay(Duration::from_millis(5))
                .with_script("p03", Script::Fail(CaseError::Transport("connection reset".into())))
                .with_script(
                    "p07",
                    Script::Fail(CaseError::HttpStatus {
                        status: 503,
                        body: "unavailable".into(),
                    }),
                ),
        );

        let outcome = coordinator(Arc::clone(&dispatcher), parallelism)
            .run(loaded(&id_refs))
            .await;

        assert_eq!(outcome.total(), 12, "parallelism {}", parallelism);
        assert_eq!(outcome.results.len(), 10);
        assert_eq!(outcome.failures.len(), 2);
        assert_eq!(sorted_ids(&outcome), ids);
        assert_eq!(dispatcher.call_count(), 12);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_in_flight_never_exceeds_parallelism() {
    let ids: Vec<String> = (0..10).map(|i| format!("case-{}", i)).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();

    let dispatcher = Arc::new(ScriptedDispatcher::new().with_default_delay(Duration::from_millis(40)));
    let outcome = coordinator(Arc::clone(&dispatcher), 3).run(loaded(&id_refs)).await;

    assert_eq!(outcome.results.len(), 10);
    assert!(dispatcher.max_in_flight() <= 3);
    assert!(dispatcher.max_in_flight() >= 2);
}

#[tokio::test]
async fn test_parallelism_one_runs_sequentially() {
    let dispatcher = Arc::new(ScriptedDispatcher::new().with_default_delay(Duration::from_millis(5)));
    let outcome = coordinator(Arc::clone(&dispatcher), 1)
        .run(loaded(&["a", "b", "c", "d"]))
        .await;

    assert_eq!(outcome.results.len(), 4);
    assert_eq!(dispatcher.max_in_flight(), 1);
}

// ============================================================================
// Failure isolation
// ============================================================================

#[tokio::test]
async fn test_integrity_error_alongside_success() {
    // Arrange: one case whose ground truth is outside its valid codes
    let dir = tempfile::tempdir().unwrap();
    write_protocol(dir.path(), "good", "fever and cough", "J06", &["J06", "J00"]);
    write_case_file(
        dir.path(),
        "bad.json",
        &protocol_json("bad", "chest pain", "I21", &["I20"]),
    );

    let files = dxeval_harness::discover_case_files(dir.path()).unwrap();
    let dispatcher = Arc::new(ScriptedDispatcher::new());

    // Act
    let outcome = coordinator(Arc::clone(&dispatcher), 2)
        .run(sources_from_files(files))
        .await;

    // Assert
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.results[0].case_id, "good");
    assert!(outcome.failures[0].error.is_dataset_error());
    assert_eq!(outcome.failures[0].error.error_code(), "DATASET_INTEGRITY");
    assert_eq!(dispatcher.calls(), vec!["good".to_string()]);

    let metrics = aggregate(&outcome.results, 3).unwrap();
    assert_eq!(metrics.total, 1);
    assert_eq!(metrics.accuracy_at_1_percent, 100.0);
}

#[tokio::test]
async fn test_malformed_file_does_not_stop_batch() {
    let dir = tempfile::tempdir().unwrap();
    write_protocol(dir.path(), "ok", "headache", "R51", &["R51"]);
    std::fs::write(dir.path().join("broken.json"), b"{ not json").unwrap();

    let files = dxeval_harness::discover_case_files(dir.path()).unwrap();
    let outcome = coordinator(Arc::new(ScriptedDispatcher::new()), 2)
        .run(sources_from_files(files))
        .await;

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].case_id, "broken.json");
    assert_eq!(outcome.failures[0].error.error_code(), "MALFORMED_CASE");
}

#[tokio::test]
async fn test_panicking_case_recorded_as_aborted() {
    let dispatcher = Arc::new(ScriptedDispatcher::new().with_script("boom", Script::Panic));
    let outcome = coordinator(Arc::clone(&dispatcher), 1)
        .run(loaded(&["first", "boom", "last"]))
        .await;

    assert_eq!(outcome.total(), 3);
    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].case_id, "boom");
    assert!(matches!(outcome.failures[0].error, CaseError::Aborted(_)));
}

#[tokio::test]
async fn test_duplicate_protocol_id_dispatched_once() {
    let dispatcher = Arc::new(ScriptedDispatcher::new());
    let outcome = coordinator(Arc::clone(&dispatcher), 1)
        .run(loaded(&["same", "same"]))
        .await;

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.failures.len(), 1);
    assert!(outcome.failures[0].error.is_dataset_error());
    assert!(outcome.failures[0].error.to_string().contains("duplicate protocol_id"));
    assert_eq!(dispatcher.call_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_duplicate_protocol_id_first_file_wins() {
    // Arrange: the first file is far larger, so it finishes loading last
    let dir = tempfile::tempdir().unwrap();
    let mut padded = serde_json::to_string(&protocol_json("dup", "first", "A00", &["A00"])).unwrap();
    padded.push_str(&" ".repeat(8 * 1024 * 1024));
    std::fs::write(dir.path().join("a.json"), padded).unwrap();
    write_case_file(dir.path(), "b.json", &protocol_json("dup", "second", "B00", &["B00"]));

    let files = dxeval_harness::discover_case_files(dir.path()).unwrap();

    for _ in 0..5 {
        let dispatcher = Arc::new(ScriptedDispatcher::new());
        let outcome = coordinator(Arc::clone(&dispatcher), 2)
            .run(sources_from_files(files.clone()))
            .await;

        // Assert: input order decides, not load timing
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].ground_truth_code, "A00");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].case_id, "b.json");
        assert!(outcome.failures[0].error.is_dataset_error());
        assert_eq!(dispatcher.call_count(), 1);
    }
}

// ============================================================================
// Classification through the coordinator
// ============================================================================

#[tokio::test]
async fn test_results_classified_with_configured_top_k() {
    let dispatcher = Arc::new(
        ScriptedDispatcher::new()
            .with_script("hit", Script::respond(&["A00", "B00"]))
            .with_script("second", Script::respond(&["B00", "A01", "C00"]))
            .with_script("miss", Script::respond(&["X00", "Y00", "A01"]))
            .with_script("empty", Script::respond(&[])),
    );
    let config = HarnessConfig::default().with_parallelism(2).with_top_k(2);
    let outcome = Coordinator::new(dispatcher, config)
        .run(loaded(&["hit", "second", "miss", "empty"]))
        .await;

    let by_id = |id: &str| {
        outcome
            .results
            .iter()
            .find(|r| r.case_id == id)
            .cloned()
            .unwrap()
    };

    let hit = by_id("hit");
    assert!(hit.accuracy_at_1);
    assert!(hit.recall_at_k);

    let second = by_id("second");
    assert!(!second.accuracy_at_1);
    assert!(second.recall_at_k);
    assert_eq!(second.top_k_predictions, vec!["B00", "A01"]);

    // A01 sits at rank 3, outside k = 2
    let miss = by_id("miss");
    assert!(!miss.recall_at_k);

    let empty = by_id("empty");
    assert_eq!(empty.top_prediction, "");
    assert!(empty.top_k_predictions.is_empty());
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let dispatcher = Arc::new(
        ScriptedDispatcher::new()
            .with_script("a", Script::respond_after(&["A00"], Duration::from_millis(3)))
            .with_script("b", Script::respond_after(&["Z99"], Duration::from_millis(1)))
            .with_script("c", Script::Fail(CaseError::ResponseParse("missing field".into()))),
    );
    let coordinator = coordinator(dispatcher, 2);

    let mut first = coordinator.run(loaded(&["a", "b", "c"])).await;
    let mut second = coordinator.run(loaded(&["a", "b", "c"])).await;

    first.results.sort_by(|x, y| x.case_id.cmp(&y.case_id));
    second.results.sort_by(|x, y| x.case_id.cmp(&y.case_id));

    assert_eq!(first.results, second.results);
    assert_eq!(first.failures, second.failures);
}

// ============================================================================
// Progress reporting
// ============================================================================

#[derive(Default)]
struct CountingObserver {
    started_with: AtomicUsize,
    finished: AtomicUsize,
    failed: AtomicUsize,
    batch_done: AtomicUsize,
}

impl ProgressObserver for CountingObserver {
    fn on_batch_start(&self, total: usize) {
        self.started_with.store(total, Ordering::SeqCst);
    }

    fn on_case_finished(&self, _case_id: &str, succeeded: bool) {
        self.finished.fetch_add(1, Ordering::SeqCst);
        if !succeeded {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn on_batch_finish(&self, _outcome: &BatchOutcome) {
        self.batch_done.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_observer_sees_every_case() {
    let observer = Arc::new(CountingObserver::default());
    let dispatcher = Arc::new(ScriptedDispatcher::new().with_script("x", Script::Panic));

    let outcome = coordinator(dispatcher, 2)
        .run_with_observer(loaded(&["v", "w", "x", "y"]), observer.clone())
        .await;

    assert_eq!(outcome.total(), 4);
    assert_eq!(observer.started_with.load(Ordering::SeqCst), 4);
    assert_eq!(observer.finished.load(Ordering::SeqCst), 4);
    assert_eq!(observer.failed.load(Ordering::SeqCst), 1);
    assert_eq!(observer.batch_done.load(Ordering::SeqCst), 1);
}
