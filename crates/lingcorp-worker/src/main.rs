//! Corpus acquisition CLI.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lingcorp_worker::{
    generate_phrases_batch, input_files, metrics, BackendConfig, DirectFetcher, DownloadConfig,
    PhraseConfig, SearchConfig, SearchFetcher, StageRun, ValidationPolicy, Validator,
    WhatlangDetector,
};

const DEFAULT_LOG_FILTER: &str = "lingcorp_worker=info,lingcorp_media=info,lingcorp_phrases=info";

#[derive(Parser, Debug)]
#[command(name = "lingcorp", about = "Language-labelled audio corpus acquisition", version)]
struct Cli {
    /// Serve Prometheus metrics on this address
    #[arg(long, env = "LINGCORP_METRICS_ADDR", global = true)]
    metrics_addr: Option<SocketAddr>,

    /// Disable progress bars
    #[arg(long, env = "LINGCORP_NO_PROGRESS", global = true)]
    no_progress: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract search phrases from a JSON-lines text corpus
    Phrases(PhraseArgs),
    /// Search videos for phrases and keep ids in the file's language
    Search(SearchArgs),
    /// Download audio for video ids until the duration quota is met
    Download(DownloadArgs),
}

#[derive(Args, Debug)]
struct BackendArgs {
    /// yt-dlp executable name or path
    #[arg(long = "yt-dlp", env = "LINGCORP_YT_DLP", default_value = "yt-dlp")]
    yt_dlp: String,

    /// Proxy for yt-dlp traffic
    #[arg(short, long, env = "LINGCORP_PROXY")]
    proxy: Option<String>,

    /// Timeout for a single yt-dlp call, in seconds
    #[arg(long, env = "LINGCORP_CALL_TIMEOUT_SECS", default_value_t = 300)]
    call_timeout_secs: u64,
}

impl BackendArgs {
    fn config(&self) -> BackendConfig {
        BackendConfig {
            yt_dlp_binary: self.yt_dlp.clone(),
            proxy: self.proxy.clone(),
            call_timeout: Duration::from_secs(self.call_timeout_secs),
        }
    }
}

#[derive(Args, Debug)]
struct PhraseArgs {
    /// Corpus file (`<lang>_*.jsonl`) or a directory of them
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory
    #[arg(short, long, env = "LINGCORP_OUTPUT", default_value = "./")]
    output: PathBuf,

    /// Words per phrase
    #[arg(long, env = "LINGCORP_PHRASE_LENGTH", default_value_t = 3)]
    phrase_length: usize,

    /// Documents sampled from the corpus
    #[arg(long, env = "LINGCORP_DOCUMENT_LIMIT", default_value_t = 2500)]
    document_limit: usize,

    /// Phrases taken from each document
    #[arg(long, env = "LINGCORP_DOCUMENT_TOP_PHRASES", default_value_t = 10)]
    document_top_phrases: usize,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Phrase file (`<lang>_search_phrases.txt`) or a directory of them
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory
    #[arg(short, long, env = "LINGCORP_OUTPUT", default_value = "./")]
    output: PathBuf,

    /// Stop after this many video ids
    #[arg(long, env = "LINGCORP_MAX_VIDEOS", default_value_t = 1000)]
    max_videos: u64,

    /// Search results requested per phrase
    #[arg(long, env = "LINGCORP_VIDEOS_PER_PHRASE", default_value_t = 1)]
    videos_per_phrase: u32,

    #[command(flatten)]
    backend: BackendArgs,
}

#[derive(Args, Debug)]
struct DownloadArgs {
    /// Id file (`<lang>_video_ids.txt`) or a directory of them
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory
    #[arg(short, long, env = "LINGCORP_OUTPUT", default_value = "./")]
    output: PathBuf,

    /// Longest single video accepted, in seconds
    #[arg(long, env = "LINGCORP_MAX_VIDEO_DURATION", default_value_t = 3600)]
    max_video_duration: u64,

    /// Stop after this many seconds of audio
    #[arg(long, env = "LINGCORP_TOTAL_DURATION", default_value_t = 540_000)]
    total_duration: u64,

    #[command(flatten)]
    backend: BackendArgs,
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

/// Flip the returned flag on Ctrl-C.
fn shutdown_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt, stopping before the next seed");
            let _ = tx.send(true);
        }
    });
    rx
}

/// Print one JSON line per finished run on stdout.
fn print_summaries<T: Serialize>(summaries: &[T]) -> Result<()> {
    for summary in summaries {
        println!("{}", serde_json::to_string(summary)?);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<bool> {
    if let Some(addr) = cli.metrics_addr {
        metrics::init_metrics(addr).context("failed to start metrics exporter")?;
        info!(%addr, "Serving metrics");
    }

    let detector = Arc::new(WhatlangDetector);
    let progress = !cli.no_progress;

    match cli.command {
        Command::Phrases(args) => {
            let config = PhraseConfig {
                output_dir: args.output,
                phrase_length: args.phrase_length,
                document_limit: args.document_limit,
                document_top_phrases: args.document_top_phrases,
            };
            config.validate()?;

            let files = input_files(&args.input).await?;
            let validator = Validator::new(ValidationPolicy::phrases(), detector);
            let outcome = generate_phrases_batch(&files, &config, &validator).await;

            print_summaries(&outcome.summaries)?;
            Ok(outcome.is_success())
        }
        Command::Search(args) => {
            let backend_config = args.backend.config();
            backend_config.validate()?;
            let config = SearchConfig {
                output_dir: args.output,
                max_videos: args.max_videos,
                videos_per_phrase: args.videos_per_phrase,
            };
            config.validate()?;

            let files = input_files(&args.input).await?;
            let backend = backend_config.connect()?;
            let fetcher = SearchFetcher::new(backend, config.videos_per_phrase);
            let validator = Validator::new(ValidationPolicy::search_results(), detector);

            let outcome = StageRun::search(&fetcher, &validator, &config)
                .with_shutdown(shutdown_signal())
                .with_progress(progress)
                .run_batch(&files)
                .await;

            print_summaries(&outcome.summaries)?;
            Ok(outcome.is_success())
        }
        Command::Download(args) => {
            let backend_config = args.backend.config();
            backend_config.validate()?;
            let config = DownloadConfig {
                output_dir: args.output,
                max_video_duration: args.max_video_duration,
                total_duration: args.total_duration,
            };
            config.validate()?;

            let files = input_files(&args.input).await?;
            let backend = backend_config.connect()?;
            let fetcher = DirectFetcher::new(backend);
            let validator = Validator::new(
                ValidationPolicy::downloads(config.max_video_duration),
                detector,
            );

            let outcome = StageRun::download(&fetcher, &validator, &config)
                .with_shutdown(shutdown_signal())
                .with_progress(progress)
                .run_batch(&files)
                .await;

            print_summaries(&outcome.summaries)?;
            Ok(outcome.is_success())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing();

    info!("Starting lingcorp");

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!("One or more runs failed");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
