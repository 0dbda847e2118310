//! Mock implementations for the dispatch seam and the diagnostic endpoint.
//!
//! [`ScriptedDispatcher`] answers in memory and tracks how many dispatches are
//! in flight. The `mount_*` helpers stand up a fake endpoint on a
//! [`wiremock::MockServer`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dxeval_domain::{CaseError, CaseResult, EvaluationCase};
use dxeval_harness::{DispatchOutcome, Dispatcher};

use crate::builders::ResponseBuilder;
use crate::fixtures::diagnoses_body;

/// Path the fake endpoint listens on
pub const DIAGNOSE_PATH: &str = "/diagnose";

/// What the scripted dispatcher does for one case
#[derive(Debug, Clone)]
pub enum Script {
    /// Answer with `codes` ranked in order after sleeping for `delay`
    Respond { codes: Vec<String>, delay: Duration },
    /// Fail with the given error
    Fail(CaseError),
    /// Panic inside the dispatch call
    Panic,
}

impl Script {
    pub fn respond(codes: &[&str]) -> Self {
        Self::Respond {
            codes: codes.iter().map(|c| c.to_string()).collect(),
            delay: Duration::ZERO,
        }
    }

    pub fn respond_after(codes: &[&str], delay: Duration) -> Self {
        Self::Respond {
            codes: codes.iter().map(|c| c.to_string()).collect(),
            delay,
        }
    }
}

/// In-memory dispatcher driven by per-case scripts.
///
/// Cases without a script are answered with their own ground-truth code
/// after the default delay.
pub struct ScriptedDispatcher {
    scripts: RwLock<HashMap<String, Script>>,
    default_delay: Duration,
    calls: Arc<RwLock<Vec<String>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedDispatcher {
    pub fn new() -> Self {
        Self {
            scripts: RwLock::new(HashMap::new()),
            default_delay: Duration::ZERO,
            calls: Arc::new(RwLock::new(Vec::new())),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn with_script(self, case_id: impl Into<String>, script: Script) -> Self {
        self.scripts.write().insert(case_id.into(), script);
        self
    }

    /// Case ids in the order dispatch was called
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().len()
    }

    /// Highest number of concurrent dispatches observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for ScriptedDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Dispatcher for ScriptedDispatcher {
    async fn dispatch(&self, case: &EvaluationCase) -> CaseResult<DispatchOutcome> {
        self.calls.write().push(case.case_id().to_string());

        let script = self
            .scripts
            .read()
            .get(case.case_id())
            .cloned()
            .unwrap_or_else(|| Script::Respond {
                codes: vec![case.ground_truth_code().to_string()],
                delay: self.default_delay,
            });

        match script {
            Script::Panic => panic!("scripted panic for {}", case.case_id()),
            Script::Fail(error) => Err(error),
            Script::Respond { codes, delay } => {
                self.enter();
                tokio::time::sleep(delay).await;
                self.leave();

                let response = codes
                    .into_iter()
                    .fold(ResponseBuilder::new(), |builder, code| builder.with_code(code))
                    .build();

                Ok(DispatchOutcome {
                    response,
                    latency: delay,
                })
            }
        }
    }
}

/// Full URL of the fake endpoint on `server`
pub fn endpoint_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), DIAGNOSE_PATH)
}

/// Answer requests for `symptoms` with `codes` ranked in order
pub async fn mount_diagnosis(server: &MockServer, symptoms: &str, codes: &[&str]) {
    mount_diagnosis_after(server, symptoms, codes, Duration::ZERO).await;
}

/// Like [`mount_diagnosis`], delaying the response by `delay`
pub async fn mount_diagnosis_after(server: &MockServer, symptoms: &str, codes: &[&str], delay: Duration) {
    Mock::given(method("POST"))
        .and(path(DIAGNOSE_PATH))
        .and(body_json(json!({ "symptoms": symptoms })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(diagnoses_body(codes))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Answer requests for `symptoms` with a non-success status
pub async fn mount_status(server: &MockServer, symptoms: &str, status: u16, body: &str) {
    Mock::given(method("POST"))
        .and(path(DIAGNOSE_PATH))
        .and(body_json(json!({ "symptoms": symptoms })))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Answer requests for `symptoms` with a raw 200 body
pub async fn mount_raw(server: &MockServer, symptoms: &str, body: &str) {
    Mock::given(method("POST"))
        .and(path(DIAGNOSE_PATH))
        .and(body_json(json!({ "symptoms": symptoms })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}
