//! Progress bar for import runs, wrapping indicatif behind the engine's
//! progress contract.

use converge_engine::Progress;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Terminal progress bar; created lazily on the first phase.
pub struct BarProgress {
    bar: Option<ProgressBar>,
    dry_run: bool,
}

impl BarProgress {
    /// A bar for one run; dry runs are prefixed so the output cannot be
    /// mistaken for a live import.
    pub fn new(dry_run: bool) -> Self {
        Self { bar: None, dry_run }
    }
}

impl Progress for BarProgress {
    fn init(&mut self, label: &str, total: u64) {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
                .expect("invalid progress bar template")
                .progress_chars("█▓▒░"),
        );
        let message = if self.dry_run {
            format!("(dry-run) {label}")
        } else {
            label.to_string()
        };
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
    }

    fn tick(&mut self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_without_a_terminal() {
        let mut progress = BarProgress::new(true);
        progress.init("executing 2 operations", 2);
        progress.tick();
        progress.tick();
        progress.finish();
        assert!(progress.bar.is_none());
    }

    #[test]
    fn ticks_before_init_are_ignored() {
        let mut progress = BarProgress::new(false);
        progress.tick();
        progress.finish();
    }
}
