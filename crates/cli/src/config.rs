//! CLI configuration management
//!
//! Handles loading configuration from ~/.dxeval/config.toml and applying
//! `DXEVAL_*` environment overrides on top of it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dxeval_harness::config::{DEFAULT_PARALLELISM, DEFAULT_TIMEOUT_SECS, DEFAULT_TOP_K};
use dxeval_harness::report::DEFAULT_OUTPUT_DIR;
use dxeval_harness::HarnessConfig;

/// Environment variable overriding `parallelism`
pub const ENV_PARALLELISM: &str = "DXEVAL_PARALLELISM";
/// Environment variable overriding `timeout_seconds`
pub const ENV_TIMEOUT_SECONDS: &str = "DXEVAL_TIMEOUT_SECONDS";
/// Environment variable overriding `top_k`
pub const ENV_TOP_K: &str = "DXEVAL_TOP_K";
/// Environment variable overriding `output_dir`
pub const ENV_OUTPUT_DIR: &str = "DXEVAL_OUTPUT_DIR";

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Maximum concurrent requests
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Cut-off for recall@k
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Directory receiving the report artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Number of case errors listed after a run
    #[serde(default = "default_error_preview_limit")]
    pub error_preview_limit: usize,

    /// Enable colored output
    #[serde(default = "default_colored")]
    pub colored: bool,
}

fn default_parallelism() -> usize {
    DEFAULT_PARALLELISM
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_error_preview_limit() -> usize {
    5
}

fn default_colored() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            timeout_seconds: default_timeout(),
            top_k: default_top_k(),
            output_dir: default_output_dir(),
            error_preview_limit: default_error_preview_limit(),
            colored: default_colored(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".dxeval"))
    }

    /// Get the config file path
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from `path` (or the default file) and the
    /// process environment.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let default_file = Self::config_file()?;
                if default_file.exists() {
                    Self::load_from_file(&default_file)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_PARALLELISM) {
            self.parallelism = parse_env(ENV_PARALLELISM, &value)?;
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECONDS) {
            self.timeout_seconds = parse_env(ENV_TIMEOUT_SECONDS, &value)?;
        }
        if let Some(value) = lookup(ENV_TOP_K) {
            self.top_k = parse_env(ENV_TOP_K, &value)?;
        }
        if let Some(value) = lookup(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(value);
        }
        if lookup("NO_COLOR").is_some() {
            self.colored = false;
        }
        Ok(())
    }

    /// Harness settings, validated
    pub fn harness_config(&self) -> Result<HarnessConfig> {
        let config = HarnessConfig::default()
            .with_parallelism(self.parallelism)
            .with_request_timeout(Duration::from_secs(self.timeout_seconds))
            .with_top_k(self.top_k);
        config.validate().context("Invalid evaluation settings")?;
        Ok(config)
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for {}: '{}'", key, value))
}
