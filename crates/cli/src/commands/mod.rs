//! CLI commands

pub mod evaluate;

use std::fmt::Display;

use crate::config::Config;
use crate::output::OutputFormat;
use dxeval_harness::DatasetDirError;

/// Context passed to all commands
pub struct CommandContext {
    pub config: Config,
    pub format: OutputFormat,
    pub show_progress: bool,
}

impl CommandContext {
    /// Create a new command context
    pub fn new(config: Config, format: OutputFormat, show_progress: bool) -> Self {
        Self {
            config,
            format,
            show_progress,
        }
    }

    /// Print a human-oriented line. Goes to stderr when stdout carries JSON.
    pub fn say(&self, line: impl Display) {
        if self.format.is_machine_readable() {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

/// Failure of a command, mapped to a process exit code
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The dataset directory is unusable
    #[error(transparent)]
    Dataset(#[from] DatasetDirError),

    /// Anything else that stops the run
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl CommandError {
    /// Exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Dataset(_) => 2,
            Self::Failed(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_codes() {
        let missing = CommandError::from(DatasetDirError::NotFound(PathBuf::from("nope")));
        assert_eq!(missing.exit_code(), 2);

        let failed = CommandError::from(anyhow::anyhow!("disk full"));
        assert_eq!(failed.exit_code(), 1);
        assert_eq!(failed.to_string(), "disk full");
    }
}
