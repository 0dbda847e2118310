//! Diagnostic evaluation CLI library
//!
//! Configuration loading, logging setup, output formatting and the evaluate
//! command behind the `dxeval` binary.

pub mod commands;
pub mod config;
pub mod output;
pub mod telemetry;

pub use commands::{CommandContext, CommandError};
pub use config::Config;
pub use output::{JsonFormatter, OutputFormat, PlainFormatter, TableFormatter};

/// Re-export common types
pub use anyhow::{Context, Result};
