//! Stage configuration.

use std::path::PathBuf;
use std::time::Duration;

use lingcorp_media::{MediaResult, YtDlp, YtDlpRunner, DEFAULT_CALL_TIMEOUT};

use crate::error::{WorkerError, WorkerResult};

/// How to reach the yt-dlp backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// yt-dlp executable name or path
    pub yt_dlp_binary: String,
    /// Proxy for all backend traffic
    pub proxy: Option<String>,
    /// Upper bound for one backend call
    pub call_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            yt_dlp_binary: "yt-dlp".to_string(),
            proxy: None,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

impl BackendConfig {
    /// Locate yt-dlp and build the backend.
    pub fn connect(&self) -> MediaResult<YtDlp> {
        let runner = YtDlpRunner::locate(&self.yt_dlp_binary, self.call_timeout)?;
        Ok(YtDlp::new(runner, self.proxy.clone()))
    }

    /// Reject a zero call timeout.
    pub fn validate(&self) -> WorkerResult<()> {
        if self.call_timeout.is_zero() {
            return Err(WorkerError::config("call timeout must be positive"));
        }
        Ok(())
    }
}

/// Phrase → video id search stage.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Directory receiving `<lang>_video_ids.txt`
    pub output_dir: PathBuf,
    /// Stop after this many accepted video ids
    pub max_videos: u64,
    /// Search results requested per phrase
    pub videos_per_phrase: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./"),
            max_videos: 1000,
            videos_per_phrase: 1,
        }
    }
}

impl SearchConfig {
    /// Reject a zero id limit or zero results per phrase.
    pub fn validate(&self) -> WorkerResult<()> {
        if self.max_videos == 0 {
            return Err(WorkerError::config("max videos must be at least 1"));
        }
        if self.videos_per_phrase == 0 {
            return Err(WorkerError::config("videos per phrase must be at least 1"));
        }
        Ok(())
    }
}

/// Video id → audio download stage.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Directory receiving `<lang>/` audio and `<lang>_downloaded_ids.txt`
    pub output_dir: PathBuf,
    /// Longest single video accepted, in seconds (exclusive)
    pub max_video_duration: u64,
    /// Stop once this many seconds of audio were downloaded
    pub total_duration: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./"),
            max_video_duration: 3600,
            total_duration: 540_000, // 150 hours
        }
    }
}

impl DownloadConfig {
    /// Reject zero durations.
    pub fn validate(&self) -> WorkerResult<()> {
        if self.max_video_duration == 0 {
            return Err(WorkerError::config("max video duration must be positive"));
        }
        if self.total_duration == 0 {
            return Err(WorkerError::config("total duration must be positive"));
        }
        Ok(())
    }
}

/// Corpus → search phrase stage.
#[derive(Debug, Clone)]
pub struct PhraseConfig {
    /// Directory receiving `<lang>_search_phrases.txt`
    pub output_dir: PathBuf,
    /// Words per phrase
    pub phrase_length: usize,
    /// Random documents sampled from the corpus
    pub document_limit: usize,
    /// Top-ranked phrases taken from each document
    pub document_top_phrases: usize,
}

impl Default for PhraseConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./"),
            phrase_length: 3,
            document_limit: 2500,
            document_top_phrases: 10,
        }
    }
}

impl PhraseConfig {
    /// Reject zero lengths and limits.
    pub fn validate(&self) -> WorkerResult<()> {
        if self.phrase_length == 0 {
            return Err(WorkerError::config("phrase length must be at least 1"));
        }
        if self.document_limit == 0 || self.document_top_phrases == 0 {
            return Err(WorkerError::config(
                "document limit and phrases per document must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(BackendConfig::default().validate().is_ok());
        assert!(SearchConfig::default().validate().is_ok());
        assert!(DownloadConfig::default().validate().is_ok());
        assert!(PhraseConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_limits_rejected() {
        let search = SearchConfig {
            videos_per_phrase: 0,
            ..Default::default()
        };
        assert!(matches!(search.validate(), Err(WorkerError::Config(_))));

        let download = DownloadConfig {
            total_duration: 0,
            ..Default::default()
        };
        assert!(download.validate().is_err());

        let backend = BackendConfig {
            call_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(backend.validate().is_err());
    }
}
