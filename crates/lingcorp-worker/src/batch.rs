//! File and directory inputs.
//!
//! Every input file is one independent run: its own language, dedup set and
//! quota. A directory is processed file by file in name order; a failed run
//! is recorded and the batch moves on.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{error, info, warn};

use lingcorp_models::{LanguageCode, OutputKind};

use crate::acquisition::{Acquisition, RunSummary, StopReason};
use crate::config::{DownloadConfig, SearchConfig};
use crate::error::{WorkerError, WorkerResult};
use crate::fetcher::{FetchContext, ItemFetcher};
use crate::persister::Persister;
use crate::progress::{IndicatifReporter, NoopReporter, ProgressReporter};
use crate::quota::{QuotaState, QuotaUnit};
use crate::source::read_seeds;
use crate::validator::Validator;

/// Resolve `--input` into the files to process.
pub async fn input_files(input: &Path) -> WorkerResult<Vec<PathBuf>> {
    let metadata = tokio::fs::metadata(input)
        .await
        .map_err(|_| WorkerError::InvalidInput(input.to_path_buf()))?;

    if metadata.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !metadata.is_dir() {
        return Err(WorkerError::InvalidInput(input.to_path_buf()));
    }

    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(input).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }

    if files.is_empty() {
        return Err(WorkerError::EmptyInputDirectory(input.to_path_buf()));
    }
    files.sort();
    Ok(files)
}

/// Results of all runs in a batch.
#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub summaries: Vec<T>,
    pub failures: Vec<(PathBuf, WorkerError)>,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            summaries: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> BatchOutcome<T> {
    /// Record the result of the run for `path`.
    pub fn record(&mut self, path: &Path, result: WorkerResult<T>) {
        match result {
            Ok(summary) => self.summaries.push(summary),
            Err(e) => {
                error!(input = %path.display(), error = %e, "Run failed");
                self.failures.push((path.to_path_buf(), e));
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One acquisition stage applied to input files.
pub struct StageRun<'a> {
    fetcher: &'a dyn ItemFetcher,
    validator: &'a Validator,
    output_dir: PathBuf,
    output_kind: OutputKind,
    unit: QuotaUnit,
    limit: u64,
    operation: &'static str,
    shutdown: Option<watch::Receiver<bool>>,
    progress: bool,
}

impl<'a> StageRun<'a> {
    /// Phrases → video ids, counted per id.
    pub fn search(fetcher: &'a dyn ItemFetcher, validator: &'a Validator, config: &SearchConfig) -> Self {
        Self {
            fetcher,
            validator,
            output_dir: config.output_dir.clone(),
            output_kind: OutputKind::VideoIds,
            unit: QuotaUnit::Count,
            limit: config.max_videos,
            operation: "video_search",
            shutdown: None,
            progress: false,
        }
    }

    /// Video ids → downloaded audio, measured in seconds.
    pub fn download(
        fetcher: &'a dyn ItemFetcher,
        validator: &'a Validator,
        config: &DownloadConfig,
    ) -> Self {
        Self {
            fetcher,
            validator,
            output_dir: config.output_dir.clone(),
            output_kind: OutputKind::DownloadedIds,
            unit: QuotaUnit::Duration,
            limit: config.total_duration,
            operation: "audio_download",
            shutdown: None,
            progress: false,
        }
    }

    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Draw a terminal progress bar for each run.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Run one input file with freshly shuffled seeds.
    pub async fn run_file(&self, input: &Path) -> WorkerResult<RunSummary> {
        let mut rng = StdRng::from_os_rng();
        self.run_file_with_rng(input, &mut rng).await
    }

    /// Run one input file, shuffling seeds with `rng`.
    pub async fn run_file_with_rng(&self, input: &Path, rng: &mut StdRng) -> WorkerResult<RunSummary> {
        let language = LanguageCode::from_input_path(input)?;
        let seeds = read_seeds(input, rng).await?;

        let ctx = FetchContext::new(language.clone(), &self.output_dir);
        let persister = Persister::new(&self.output_dir, &language, self.output_kind);
        let quota = QuotaState::new(self.unit, self.limit);

        let mut acquisition = Acquisition::new(
            self.fetcher,
            self.validator,
            ctx,
            persister,
            quota,
            self.operation,
        );
        if let Some(shutdown) = &self.shutdown {
            acquisition = acquisition.with_shutdown(shutdown.clone());
        }

        let mut reporter: Box<dyn ProgressReporter> = if self.progress {
            Box::new(IndicatifReporter::new())
        } else {
            Box::new(NoopReporter)
        };
        acquisition.run(seeds, reporter.as_mut()).await
    }

    /// Run every file in order; an interrupt ends the batch.
    pub async fn run_batch(&self, files: &[PathBuf]) -> BatchOutcome<RunSummary> {
        let mut outcome = BatchOutcome::default();

        for (index, path) in files.iter().enumerate() {
            info!(
                input = %path.display(),
                file = index + 1,
                files = files.len(),
                "Processing input file"
            );

            let result = self.run_file(path).await;
            let interrupted = matches!(&result, Ok(s) if s.stop == StopReason::Interrupted);
            outcome.record(path, result);

            if interrupted {
                warn!(remaining = files.len() - index - 1, "Batch interrupted");
                break;
            }
        }

        outcome
    }
}
