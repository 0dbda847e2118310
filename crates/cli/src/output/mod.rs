//! Output formatting for CLI

use anyhow::Result;

mod formatters;
mod progress;
mod summary;
mod table;

pub use formatters::{JsonFormatter, PlainFormatter};
pub use progress::ProgressReporter;
pub use summary::{LatencySummary, ReportLocations, RunSummary};
pub use table::TableFormatter;

/// Output format enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Table output (default)
    #[default]
    Table,
    /// Plain text output
    Plain,
}

impl OutputFormat {
    /// Whether stdout carries machine-readable output only
    pub fn is_machine_readable(&self) -> bool {
        matches!(self, Self::Json)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Table => write!(f, "table"),
            Self::Plain => write!(f, "plain"),
        }
    }
}

/// Render a run summary in `format`
pub fn render_summary(summary: &RunSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => JsonFormatter::format(summary),
        OutputFormat::Table => TableFormatter::summary(summary),
        OutputFormat::Plain => PlainFormatter::format(summary),
    }
}

/// Color helpers
pub mod colors {
    use colored::*;

    pub fn success(s: &str) -> ColoredString {
        s.green()
    }

    pub fn error(s: &str) -> ColoredString {
        s.red()
    }

    pub fn warning(s: &str) -> ColoredString {
        s.yellow()
    }

    pub fn info(s: &str) -> ColoredString {
        s.blue()
    }

    pub fn dim(s: &str) -> ColoredString {
        s.dimmed()
    }

    pub fn bold(s: &str) -> ColoredString {
        s.bold()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Plain.to_string(), "plain");
    }

    #[test]
    fn test_only_json_is_machine_readable() {
        assert!(OutputFormat::Json.is_machine_readable());
        assert!(!OutputFormat::Table.is_machine_readable());
        assert!(!OutputFormat::Plain.is_machine_readable());
    }
}
