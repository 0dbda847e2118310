//! Harness configuration.
//!
//! Passed explicitly into the dispatcher and the coordinator, so batches with
//! different settings can run side by side.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default number of requests in flight
pub const DEFAULT_PARALLELISM: usize = 2;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default cut-off for recall@k
pub const DEFAULT_TOP_K: usize = 3;

/// Invalid configuration value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Parallelism of zero would never dispatch anything
    #[error("parallelism must be at least 1")]
    ZeroParallelism,

    /// A zero timeout fails every request
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    /// recall@0 is meaningless
    #[error("top_k must be at least 1")]
    ZeroTopK,
}

/// Settings for one evaluation batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Maximum number of dispatches in flight at once
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    /// Upper bound for a single request, including reading the body
    #[serde(default = "default_timeout", with = "duration_secs")]
    pub request_timeout: Duration,

    /// Number of top predictions considered for recall
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_parallelism() -> usize {
    DEFAULT_PARALLELISM
}

fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            request_timeout: default_timeout(),
            top_k: default_top_k(),
        }
    }
}

impl HarnessConfig {
    /// Set the parallelism bound
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the recall cut-off
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Reject values the harness cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parallelism == 0 {
            return Err(ConfigError::ZeroParallelism);
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.top_k == 0 {
            return Err(ConfigError::ZeroTopK);
        }
        Ok(())
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
