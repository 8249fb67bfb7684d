//! Progress reporting.
//!
//! Reporters observe the quota after each seed; they have no say in when
//! the loop stops.

use indicatif::{ProgressBar, ProgressStyle};

use lingcorp_models::LanguageCode;

use crate::acquisition::RunSummary;
use crate::quota::QuotaState;

const BAR_TEMPLATE: &str = "{spinner:.green} {msg} [{bar:40.cyan/blue}] {percent}% ({elapsed})";

/// Observer of a run's progress.
pub trait ProgressReporter: Send {
    /// Called once before the first seed.
    fn start(&mut self, language: &LanguageCode, quota: &QuotaState, seeds_total: usize);

    /// Called after each processed seed.
    fn seed_done(&mut self, quota: &QuotaState, seeds_consumed: usize);

    /// Called once when the run stops.
    fn finish(&mut self, summary: &RunSummary);
}

/// Reporter that ignores everything.
#[derive(Debug, Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn start(&mut self, _language: &LanguageCode, _quota: &QuotaState, _seeds_total: usize) {}

    fn seed_done(&mut self, _quota: &QuotaState, _seeds_consumed: usize) {}

    fn finish(&mut self, _summary: &RunSummary) {}
}

/// Terminal progress bar over the quota.
///
/// Bar position is the accumulated measure, length the limit; the message
/// shows the language, the human-readable measure and consumed seeds.
#[derive(Default)]
pub struct IndicatifReporter {
    bar: Option<ProgressBar>,
    language: String,
    seeds_total: usize,
}

impl IndicatifReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn message(&self, quota: &QuotaState, seeds_consumed: usize) -> String {
        format!(
            "{} {} (seeds {}/{})",
            self.language, quota, seeds_consumed, self.seeds_total
        )
    }
}

impl ProgressReporter for IndicatifReporter {
    fn start(&mut self, language: &LanguageCode, quota: &QuotaState, seeds_total: usize) {
        self.language = language.to_string();
        self.seeds_total = seeds_total;

        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");

        let bar = ProgressBar::new(quota.limit()).with_style(style);
        bar.set_message(self.message(quota, 0));
        self.bar = Some(bar);
    }

    fn seed_done(&mut self, quota: &QuotaState, seeds_consumed: usize) {
        if let Some(bar) = &self.bar {
            bar.set_position(quota.accumulated().min(quota.limit()));
            bar.set_message(self.message(quota, seeds_consumed));
        }
    }

    fn finish(&mut self, summary: &RunSummary) {
        if let Some(bar) = self.bar.take() {
            bar.set_position(summary.accumulated.min(summary.limit));
            bar.abandon_with_message(format!("{} {}", self.language, summary.stop));
        }
    }
}

/// Render seconds as hours with two decimals, e.g. `"1.25h"`.
pub fn format_duration(seconds: u64) -> String {
    format!("{:.2}h", seconds as f64 / 3600.0)
}
