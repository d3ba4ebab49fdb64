//! Progress reporting for recommendation runs

use indicatif::{ProgressBar, ProgressStyle};
use log::warn;

/// Receives stage checkpoints during a run.
///
/// `report` is called with non-decreasing percentages; `clear` exactly once
/// after the run has started, whatever its outcome.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, percent: u8, label: &str);

    fn clear(&self);
}

/// Terminal progress bar
pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        match ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}") {
            Ok(style) => bar.set_style(style.progress_chars("=> ")),
            Err(e) => warn!("Invalid progress template: {}", e),
        }
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for IndicatifProgress {
    fn report(&self, percent: u8, label: &str) {
        self.bar.set_position(u64::from(percent.min(100)));
        self.bar.set_message(label.to_string());
    }

    fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

/// Discards all progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _percent: u8, _label: &str) {}

    fn clear(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_bar_tracks_position() {
        let progress = IndicatifProgress::hidden();
        progress.report(50, "Analyzing employee benefits...");
        assert_eq!(progress.bar.position(), 50);
        progress.clear();
        assert!(progress.bar.is_finished());
    }
}
