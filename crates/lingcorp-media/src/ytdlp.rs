//! Video search, metadata probing and audio download using yt-dlp.
//!
//! Every call is one blocking yt-dlp invocation bounded by the runner's
//! timeout. Failures are returned per call (and, for searches, per result)
//! so callers can drop a single item and carry on.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use lingcorp_models::VideoId;

use crate::command::{is_rate_limited, last_error_line, YtDlpCommand, YtDlpRunner};
use crate::error::{MediaError, MediaResult};
use crate::info::VideoInfo;

/// Suffix yt-dlp gives metadata files written with `--write-info-json`.
const INFO_JSON_SUFFIX: &str = ".info.json";

/// Audio format selector.
const AUDIO_FORMAT: &str = "bestaudio/best";

/// Skip live broadcasts.
const NOT_LIVE_FILTER: &str = "!is_live";

/// yt-dlp backend.
#[derive(Debug, Clone)]
pub struct YtDlp {
    runner: YtDlpRunner,
    proxy: Option<String>,
}

impl YtDlp {
    /// Create a backend from a runner and an optional proxy.
    pub fn new(runner: YtDlpRunner, proxy: Option<String>) -> Self {
        Self { runner, proxy }
    }

    /// Search for `count` videos matching `phrase` and return their metadata.
    ///
    /// Metadata is written by yt-dlp into a scratch directory that is removed
    /// when the call returns. Each result is decoded on its own: a broken
    /// document becomes an `Err` entry and does not affect its siblings.
    pub async fn search(&self, phrase: &str, count: u32) -> MediaResult<Vec<MediaResult<VideoInfo>>> {
        let scratch = tempfile::Builder::new()
            .prefix("lingcorp-search-")
            .tempdir()?;

        let cmd = YtDlpCommand::search(phrase, count)
            .output_template(scratch.path().join("%(id)s.%(ext)s"))
            .no_playlist()
            .write_info_json()
            .no_write_playlist_metafiles()
            .skip_download()
            .quiet()
            .ignore_errors()
            .proxy(self.proxy.as_deref());

        let output = self.runner.run(&cmd).await?;
        let stderr = String::from_utf8_lossy(&output.stderr);

        let results = read_info_files(scratch.path()).await?;

        if !output.status.success() {
            debug!("yt-dlp search stderr: {}", stderr);
            if is_rate_limited(&stderr) {
                warn!(phrase = %phrase, "YouTube rate limit detected");
            }
            if results.is_empty() {
                return Err(MediaError::ytdlp_failed(
                    last_error_line(&stderr),
                    Some(stderr.to_string()),
                    output.status.code(),
                ));
            }
        }

        debug!(phrase = %phrase, results = results.len(), "Search finished");
        Ok(results)
    }

    /// Fetch metadata for a single video without downloading it.
    ///
    /// Returns `Ok(None)` when yt-dlp succeeded but printed no metadata.
    pub async fn probe(&self, id: &VideoId) -> MediaResult<Option<VideoInfo>> {
        let cmd = YtDlpCommand::new(id.watch_url())
            .dump_json()
            .skip_download()
            .no_playlist()
            .quiet()
            .proxy(self.proxy.as_deref());

        let output = self.runner.run(&cmd).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp probe stderr: {}", stderr);
            if is_rate_limited(&stderr) {
                warn!(video_id = %id, "YouTube rate limit detected");
            }
            return Err(MediaError::ytdlp_failed(
                last_error_line(&stderr),
                Some(stderr.to_string()),
                output.status.code(),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match stdout.lines().find(|l| !l.trim().is_empty()) {
            Some(line) => VideoInfo::from_json_slice(line.as_bytes()).map(Some),
            None => Ok(None),
        }
    }

    /// Download the best available audio of a video into `dest_dir`.
    ///
    /// The file is named `<id>.<ext>`; an existing file is kept as is.
    pub async fn download_audio(&self, id: &VideoId, dest_dir: impl AsRef<Path>) -> MediaResult<PathBuf> {
        let dest_dir = dest_dir.as_ref();
        tokio::fs::create_dir_all(dest_dir).await?;

        info!(video_id = %id, dest = %dest_dir.display(), "Downloading audio");

        let cmd = YtDlpCommand::new(id.watch_url())
            .format(AUDIO_FORMAT)
            .extract_audio()
            .write_info_json()
            .no_overwrites()
            .no_playlist()
            .match_filter(NOT_LIVE_FILTER)
            .quiet()
            .output_template(dest_dir.join("%(id)s.%(ext)s"))
            .proxy(self.proxy.as_deref());

        let output = self.runner.run(&cmd).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp download stderr: {}", stderr);
            if is_rate_limited(&stderr) {
                warn!(video_id = %id, "YouTube rate limit detected");
            }
            return Err(MediaError::download_failed(format!(
                "yt-dlp failed: {}",
                last_error_line(&stderr)
            )));
        }

        // Verify the audio file was created
        let audio = find_audio_file(dest_dir, id.as_str())
            .await?
            .ok_or_else(|| MediaError::download_failed("Output file not created"))?;

        let file_size = tokio::fs::metadata(&audio).await?.len();
        info!(
            video_id = %id,
            output = %audio.display(),
            size_mb = file_size as f64 / (1024.0 * 1024.0),
            "Downloaded audio successfully"
        );

        Ok(audio)
    }
}

/// Decode every `*.info.json` file in `dir`, one result per file.
async fn read_info_files(dir: &Path) -> MediaResult<Vec<MediaResult<VideoInfo>>> {
    let mut paths = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_info = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(INFO_JSON_SUFFIX));
        if is_info {
            paths.push(path);
        }
    }
    paths.sort();

    let mut results = Vec::with_capacity(paths.len());
    for path in paths {
        let decoded = match tokio::fs::read(&path).await {
            Ok(bytes) => VideoInfo::from_json_slice(&bytes),
            Err(e) => Err(MediaError::from(e)),
        };
        if let Err(e) = &decoded {
            warn!(file = %path.display(), error = %e, "Failed to decode metadata file");
        }
        results.push(decoded);
    }

    Ok(results)
}

/// Find the audio file yt-dlp wrote for `id`, ignoring its metadata file.
async fn find_audio_file(dir: &Path, id: &str) -> MediaResult<Option<PathBuf>> {
    let prefix = format!("{}.", id);
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with(&prefix) && !name.ends_with(INFO_JSON_SUFFIX) && !name.ends_with(".part") {
            return Ok(Some(entry.path()));
        }
    }
    Ok(None)
}
