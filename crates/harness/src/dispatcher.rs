//! Request dispatch to the diagnostic endpoint.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use dxeval_domain::{
    CaseError, CaseResult, DiagnosticRequest, DiagnosticResponse, EvaluationCase,
};

use crate::config::HarnessConfig;

/// Longest slice of an error body kept in an [`CaseError::HttpStatus`]
const MAX_ERROR_BODY_CHARS: usize = 200;

/// A parsed response together with the time it took to obtain it
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    /// Validated endpoint response
    pub response: DiagnosticResponse,
    /// Wall-clock time from just before send to the last body byte
    pub latency: Duration,
}

/// Sends one case to a diagnostic endpoint.
///
/// Implementations must be shareable across tasks; the coordinator holds one
/// instance for the whole batch.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Issue the request for `case`. Exactly one outbound call per invocation,
    /// never retried.
    async fn dispatch(&self, case: &EvaluationCase) -> CaseResult<DispatchOutcome>;
}

/// HTTP dispatcher posting `{"symptoms": ...}` as JSON
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpDispatcher {
    /// Create a dispatcher for `endpoint` with the configured timeout
    pub fn new(endpoint: &str, config: &HarnessConfig) -> anyhow::Result<Self> {
        let endpoint = parse_endpoint(endpoint)?;
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            endpoint,
            timeout: config.request_timeout,
        })
    }

    /// Target URL
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn transport_error(&self, err: reqwest::Error) -> CaseError {
        if err.is_timeout() {
            CaseError::Transport(format!(
                "request timed out after {}s",
                self.timeout.as_secs_f64()
            ))
        } else {
            CaseError::Transport(err.to_string())
        }
    }
}

/// Validate an endpoint URL; only `http` and `https` are accepted
pub fn parse_endpoint(endpoint: &str) -> anyhow::Result<Url> {
    let url = Url::parse(endpoint)
        .map_err(|e| anyhow::anyhow!("Invalid endpoint URL '{}': {}", endpoint, e))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => anyhow::bail!("Unsupported endpoint scheme '{}' in '{}'", other, endpoint),
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn dispatch(&self, case: &EvaluationCase) -> CaseResult<DispatchOutcome> {
        let body = DiagnosticRequest {
            symptoms: case.query_text().to_string(),
        };

        let start = Instant::now();
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        let latency = start.elapsed();

        if !status.is_success() {
            return Err(CaseError::HttpStatus {
                status: status.as_u16(),
                body: truncate(&String::from_utf8_lossy(&bytes), MAX_ERROR_BODY_CHARS),
            });
        }

        let response = DiagnosticResponse::from_slice(&bytes)?;

        Ok(DispatchOutcome { response, latency })
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatcher_creation() {
        let dispatcher =
            HttpDispatcher::new("http://localhost:8000/diagnose", &HarnessConfig::default());
        assert!(dispatcher.is_ok());
        assert_eq!(dispatcher.unwrap().endpoint().path(), "/diagnose");
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(parse_endpoint("localhost:8000/diagnose").is_err());
        assert!(parse_endpoint("not a url").is_err());
        assert!(parse_endpoint("ftp://example.com/diagnose").is_err());
        assert!(parse_endpoint("https://example.com/diagnose").is_ok());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("ßßßß", 2), "ßß...");
    }
}
