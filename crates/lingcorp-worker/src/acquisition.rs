//! The acquisition loop.
//!
//! One [`Acquisition`] drives one run: seeds are consumed in order, each is
//! fetched, its candidates validated and deduplicated, accepted ids appended
//! to the output file and offered to the quota. The run ends when the quota
//! is satisfied, the seeds run out, or an interrupt is requested.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tokio::sync::watch;
use tracing::{debug, Instrument};

use lingcorp_models::{LanguageCode, Seed};

use crate::dedup::DedupSet;
use crate::error::WorkerResult;
use crate::fetcher::{FetchContext, ItemFetcher};
use crate::logging::{RunId, RunLogger};
use crate::metrics;
use crate::persister::Persister;
use crate::progress::ProgressReporter;
use crate::quota::{QuotaState, QuotaUnit};
use crate::validator::{Validator, Verdict};

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Accumulated measure reached the limit
    QuotaSatisfied,
    /// Every seed was consumed before the limit was reached
    SeedsExhausted,
    /// An interrupt arrived before the next seed
    Interrupted,
}

impl StopReason {
    /// Short label for metrics and JSON output.
    pub fn label(&self) -> &'static str {
        match self {
            StopReason::QuotaSatisfied => "quota_satisfied",
            StopReason::SeedsExhausted => "seeds_exhausted",
            StopReason::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::QuotaSatisfied => write!(f, "quota satisfied"),
            StopReason::SeedsExhausted => write!(f, "seeds exhausted"),
            StopReason::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Outcome of one finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub language: LanguageCode,
    pub unit: QuotaUnit,
    pub accumulated: u64,
    pub limit: u64,
    /// Ids appended to the output file
    pub accepted: usize,
    pub seeds_total: usize,
    pub seeds_consumed: usize,
    /// Candidates turned down by validation
    pub rejected: usize,
    /// Candidates already accepted earlier in the run
    pub duplicates: usize,
    /// Seeds and candidates dropped after a backend failure
    pub skipped: usize,
    pub stop: StopReason,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn shortfall(&self) -> u64 {
        self.limit.saturating_sub(self.accumulated)
    }
}

/// One acquisition run over a seed sequence.
pub struct Acquisition<'a> {
    fetcher: &'a dyn ItemFetcher,
    validator: &'a Validator,
    ctx: FetchContext,
    persister: Persister,
    quota: QuotaState,
    dedup: DedupSet,
    logger: RunLogger,
    shutdown: Option<watch::Receiver<bool>>,
}

#[derive(Debug, Default)]
struct Counters {
    accepted: usize,
    rejected: usize,
    duplicates: usize,
    skipped: usize,
    seeds_consumed: usize,
}

impl<'a> Acquisition<'a> {
    /// Prepare a run. `operation` names the run in logs (e.g. "video_search").
    pub fn new(
        fetcher: &'a dyn ItemFetcher,
        validator: &'a Validator,
        ctx: FetchContext,
        persister: Persister,
        quota: QuotaState,
        operation: &str,
    ) -> Self {
        let logger = RunLogger::new(&ctx.language, operation);
        Self {
            fetcher,
            validator,
            ctx,
            persister,
            quota,
            dedup: DedupSet::new(),
            logger,
            shutdown: None,
        }
    }

    /// Stop before the next seed once `shutdown` turns `true`.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn run_id(&self) -> RunId {
        self.logger.run_id()
    }

    /// Consume `seeds` until a stop condition holds.
    ///
    /// Only a persistence failure ends the run with an error; backend
    /// failures skip the affected seed or candidate.
    pub async fn run(
        self,
        seeds: Vec<Seed>,
        reporter: &mut dyn ProgressReporter,
    ) -> WorkerResult<RunSummary> {
        let span = self.logger.create_span();
        self.drive(seeds, reporter).instrument(span).await
    }

    async fn drive(
        mut self,
        seeds: Vec<Seed>,
        reporter: &mut dyn ProgressReporter,
    ) -> WorkerResult<RunSummary> {
        let started_at = Utc::now();
        let seeds_total = seeds.len();
        let language = self.ctx.language.as_str().to_string();
        let mut counters = Counters::default();

        self.logger.log_start(&format!(
            "{} seeds via {}, quota {} ({}), output {}",
            seeds_total,
            self.fetcher.name(),
            self.quota.unit().format(self.quota.limit()),
            self.quota.unit(),
            self.persister.path().display()
        ));
        reporter.start(&self.ctx.language, &self.quota, seeds_total);

        // A zero limit is met before any fetch
        let mut stop = if self.quota.is_satisfied() {
            Some(StopReason::QuotaSatisfied)
        } else {
            None
        };

        let mut seeds = seeds.into_iter();
        while stop.is_none() {
            if self.interrupted() {
                stop = Some(StopReason::Interrupted);
                break;
            }

            let Some(seed) = seeds.next() else {
                stop = Some(StopReason::SeedsExhausted);
                break;
            };
            counters.seeds_consumed += 1;

            let batch = self.process_seed(&seed, &language, &mut counters).await;

            // Progress only ever reflects ids that reached the file
            self.persister.append(&batch).await.inspect_err(|e| {
                self.logger.log_error(&e.to_string());
            })?;

            if !batch.is_empty() {
                self.logger.log_progress(&format!(
                    "{} new ids from seed {}, quota {}",
                    batch.len(),
                    counters.seeds_consumed,
                    self.quota
                ));
            }
            metrics::set_quota_accumulated(&language, self.quota.accumulated());
            reporter.seed_done(&self.quota, counters.seeds_consumed);

            if self.quota.is_satisfied() {
                stop = Some(StopReason::QuotaSatisfied);
            }
        }

        let stop = stop.unwrap_or(StopReason::SeedsExhausted);
        let summary = RunSummary {
            run_id: self.logger.run_id(),
            language: self.ctx.language.clone(),
            unit: self.quota.unit(),
            accumulated: self.quota.accumulated(),
            limit: self.quota.limit(),
            accepted: counters.accepted,
            seeds_total,
            seeds_consumed: counters.seeds_consumed,
            rejected: counters.rejected,
            duplicates: counters.duplicates,
            skipped: counters.skipped,
            stop,
            started_at,
            finished_at: Utc::now(),
        };

        self.log_summary(&summary);
        metrics::record_run_finished(&language, stop.label());
        reporter.finish(&summary);

        Ok(summary)
    }

    /// Fetch one seed and return the ids accepted from it, in order.
    async fn process_seed(
        &mut self,
        seed: &Seed,
        language: &str,
        counters: &mut Counters,
    ) -> Vec<String> {
        let mut batch = Vec::new();

        let candidates = match self.fetcher.fetch(seed, &self.ctx).await {
            Ok(candidates) => candidates,
            Err(skip) => {
                counters.skipped += 1;
                metrics::record_item_skipped(language);
                self.logger.log_warning(&format!("seed skipped: {}", skip));
                return batch;
            }
        };
        metrics::record_seed_fetched(language);
        debug!(seed = %seed, candidates = candidates.len(), "Fetched seed");

        for fetched in candidates {
            let item = match fetched {
                Ok(item) => item,
                Err(skip) => {
                    counters.skipped += 1;
                    metrics::record_item_skipped(language);
                    self.logger.log_warning(&format!("candidate skipped: {}", skip));
                    continue;
                }
            };

            if let Verdict::Reject(reason) = self.validator.validate(&item, &self.ctx.language) {
                counters.rejected += 1;
                metrics::record_candidate_rejected(language, reason.label());
                debug!(id = %item.id, reason = %reason, "Candidate rejected");
                continue;
            }

            if !self.dedup.should_accept(&item.id) {
                counters.duplicates += 1;
                metrics::record_candidate_rejected(language, "duplicate");
                debug!(id = %item.id, "Candidate already accepted in this run");
                continue;
            }

            if let Err(skip) = self.fetcher.commit(&item, &self.ctx).await {
                counters.skipped += 1;
                metrics::record_item_skipped(language);
                self.logger.log_warning(&format!("commit failed: {}", skip));
                continue;
            }

            self.dedup.record(&item.id);
            if !self.quota.offer(&item) {
                debug!(id = %item.id, unit = %self.quota.unit(), "Accepted item carries no measure");
            }
            counters.accepted += 1;
            metrics::record_candidate_accepted(language);
            debug!(id = %item.id, quota = %self.quota, "Candidate accepted");
            batch.push(item.id);

            if self.quota.is_satisfied() {
                break;
            }
        }

        batch
    }

    fn interrupted(&self) -> bool {
        self.shutdown
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or(false)
    }

    fn log_summary(&self, summary: &RunSummary) {
        let unit = summary.unit;
        match summary.stop {
            StopReason::QuotaSatisfied => self.logger.log_completion(&format!(
                "quota satisfied with {} ({} accepted, {} of {} seeds used)",
                unit.format(summary.accumulated),
                summary.accepted,
                summary.seeds_consumed,
                summary.seeds_total
            )),
            StopReason::SeedsExhausted => self.logger.log_warning(&format!(
                "seeds exhausted at {} of {}, short by {} ({} accepted, {} rejected, {} skipped)",
                unit.format(summary.accumulated),
                unit.format(summary.limit),
                unit.format(summary.shortfall()),
                summary.accepted,
                summary.rejected,
                summary.skipped
            )),
            StopReason::Interrupted => self.logger.log_warning(&format!(
                "interrupted at {} of {} after {} of {} seeds",
                unit.format(summary.accumulated),
                unit.format(summary.limit),
                summary.seeds_consumed,
                summary.seeds_total
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_reason_labels() {
        assert_eq!(StopReason::QuotaSatisfied.label(), "quota_satisfied");
        assert_eq!(StopReason::SeedsExhausted.to_string(), "seeds exhausted");
        assert_eq!(StopReason::Interrupted.label(), "interrupted");
        assert_eq!(
            serde_json::to_string(&StopReason::SeedsExhausted).unwrap(),
            "\"seeds_exhausted\""
        );
    }
}
