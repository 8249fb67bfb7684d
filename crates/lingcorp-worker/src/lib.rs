//! Quota-driven corpus acquisition.
//!
//! This crate provides:
//! - The acquisition loop (seeds → candidates → validation → dedup → quota)
//! - Search and direct fetchers over the yt-dlp backend
//! - Language detection and phrase checks
//! - Append-only id persistence
//! - The phrase stage and directory batching
//! - Run logging, metrics and progress reporting

pub mod acquisition;
pub mod batch;
pub mod config;
pub mod dedup;
pub mod error;
pub mod fetcher;
pub mod language;
pub mod logging;
pub mod metrics;
pub mod persister;
pub mod phrase_stage;
pub mod progress;
pub mod quota;
pub mod source;
pub mod validator;

pub use acquisition::{Acquisition, RunSummary, StopReason};
pub use batch::{input_files, BatchOutcome, StageRun};
pub use config::{BackendConfig, DownloadConfig, PhraseConfig, SearchConfig};
pub use dedup::DedupSet;
pub use error::{WorkerError, WorkerResult};
pub use fetcher::{DirectFetcher, FetchContext, Fetched, ItemFetcher, SearchFetcher, Skip};
pub use language::{LanguageDetector, WhatlangDetector};
pub use logging::{RunId, RunLogger};
pub use persister::Persister;
pub use phrase_stage::{generate_phrases, generate_phrases_batch, PhraseSummary};
pub use progress::{IndicatifReporter, NoopReporter, ProgressReporter};
pub use quota::{QuotaState, QuotaUnit};
pub use source::read_seeds;
pub use validator::{RejectReason, ValidationPolicy, Validator, Verdict};
