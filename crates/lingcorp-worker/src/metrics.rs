//! Prometheus metrics for acquisition runs.
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()
}

/// Metric names as constants for consistency.
pub mod names {
    pub const SEEDS_FETCHED_TOTAL: &str = "lingcorp_seeds_fetched_total";
    pub const CANDIDATES_ACCEPTED_TOTAL: &str = "lingcorp_candidates_accepted_total";
    pub const CANDIDATES_REJECTED_TOTAL: &str = "lingcorp_candidates_rejected_total";
    pub const ITEMS_SKIPPED_TOTAL: &str = "lingcorp_items_skipped_total";
    pub const RUNS_FINISHED_TOTAL: &str = "lingcorp_runs_finished_total";
    pub const QUOTA_ACCUMULATED: &str = "lingcorp_quota_accumulated";
}

pub fn record_seed_fetched(language: &str) {
    let labels = [("language", language.to_string())];
    counter!(names::SEEDS_FETCHED_TOTAL, &labels).increment(1);
}

pub fn record_candidate_accepted(language: &str) {
    let labels = [("language", language.to_string())];
    counter!(names::CANDIDATES_ACCEPTED_TOTAL, &labels).increment(1);
}

pub fn record_candidate_rejected(language: &str, reason: &'static str) {
    let labels = [
        ("language", language.to_string()),
        ("reason", reason.to_string()),
    ];
    counter!(names::CANDIDATES_REJECTED_TOTAL, &labels).increment(1);
}

pub fn record_item_skipped(language: &str) {
    let labels = [("language", language.to_string())];
    counter!(names::ITEMS_SKIPPED_TOTAL, &labels).increment(1);
}

pub fn record_run_finished(language: &str, stop: &'static str) {
    let labels = [
        ("language", language.to_string()),
        ("stop", stop.to_string()),
    ];
    counter!(names::RUNS_FINISHED_TOTAL, &labels).increment(1);
}

pub fn set_quota_accumulated(language: &str, accumulated: u64) {
    let labels = [("language", language.to_string())];
    gauge!(names::QUOTA_ACCUMULATED, &labels).set(accumulated as f64);
}
