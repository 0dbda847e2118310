//! Progress bar for a running batch.

use indicatif::{ProgressBar, ProgressStyle};

use dxeval_domain::BatchOutcome;
use dxeval_harness::ProgressObserver;

/// Drives an `indicatif` bar from coordinator callbacks
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a reporter; a hidden one draws nothing
    pub fn new(visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }

        Self { bar }
    }

    /// Cases finished so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl ProgressObserver for ProgressReporter {
    fn on_batch_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
    }

    fn on_case_finished(&self, case_id: &str, _succeeded: bool) {
        self.bar.set_message(case_id.to_string());
        self.bar.inc(1);
    }

    fn on_batch_finish(&self, _outcome: &BatchOutcome) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_reporter_counts_cases() {
        let reporter = ProgressReporter::new(false);
        reporter.on_batch_start(3);
        reporter.on_case_finished("p1", true);
        reporter.on_case_finished("p2", false);

        assert_eq!(reporter.position(), 2);
        assert_eq!(reporter.bar.length(), Some(3));
    }
}
