//! Progress display for a running export
//!
//! RDS tables run to tens of millions of rows. Without a known total the
//! display is a spinner with a running count; with `count_rows` enabled the
//! row count from a `count(*)` pass sizes a proper bar with an ETA.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{spinner:.green} {prefix} [{bar:40.cyan/blue}] {human_pos}/{human_len} ({per_sec}, eta {eta})";
const SPINNER_TEMPLATE: &str = "{spinner:.green} {prefix} {human_pos} values ({per_sec})";

/// Tracks how many values of a column have been written.
pub struct ProgressTracker {
    processed: u64,
    bar: Option<ProgressBar>,
}

impl ProgressTracker {
    /// Create a tracker for the column `label` (e.g. `FILE.md5`).
    ///
    /// `total` selects a bar over a spinner. Nothing is drawn unless
    /// `enable_bar` is set, and the bar goes to stderr so it never mixes with
    /// values written to stdout.
    pub fn new(label: &str, total: Option<u64>, enable_bar: bool) -> Self {
        let bar = enable_bar.then(|| {
            let target = ProgressDrawTarget::stderr();
            let (bar, template) = match total {
                Some(n) => (ProgressBar::with_draw_target(Some(n), target), BAR_TEMPLATE),
                None => (ProgressBar::with_draw_target(None, target), SPINNER_TEMPLATE),
            };
            if let Ok(style) = ProgressStyle::with_template(template) {
                bar.set_style(style.progress_chars("#>-"));
            }
            bar.set_prefix(label.to_string());
            bar
        });

        Self { processed: 0, bar }
    }

    /// Tracker that never draws anything
    pub fn hidden() -> Self {
        Self::new("", None, false)
    }

    /// Record the running total of values written.
    pub fn update(&mut self, count: u64) {
        self.processed = count;
        if let Some(bar) = &self.bar {
            bar.set_position(count);
        }
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Whether anything is drawn.
    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }

    /// Clear the display; the summary is logged by the caller.
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
