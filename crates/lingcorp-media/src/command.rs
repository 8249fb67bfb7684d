//! yt-dlp command builder and runner.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Default upper bound for a single yt-dlp invocation.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(300);

/// Builder for yt-dlp commands.
#[derive(Debug, Clone)]
pub struct YtDlpCommand {
    /// URL, id or `ytsearchN:` query
    target: String,
    /// Option arguments (before the target)
    args: Vec<String>,
    /// Output template (`-o`)
    output_template: Option<PathBuf>,
    /// Proxy URL
    proxy: Option<String>,
}

impl YtDlpCommand {
    /// Create a new yt-dlp command for a target.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            args: Vec::new(),
            output_template: None,
            proxy: None,
        }
    }

    /// Create a search command returning up to `count` results for `phrase`.
    pub fn search(phrase: &str, count: u32) -> Self {
        Self::new(format!("ytsearch{}:{}", count, phrase.trim()))
    }

    /// Add an option argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple option arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set output template (e.g. `dir/%(id)s.%(ext)s`).
    pub fn output_template(mut self, template: impl AsRef<Path>) -> Self {
        self.output_template = Some(template.as_ref().to_path_buf());
        self
    }

    /// Route traffic through a proxy.
    pub fn proxy(mut self, proxy: Option<&str>) -> Self {
        self.proxy = proxy.map(str::to_string);
        self
    }

    /// Suppress normal output.
    pub fn quiet(self) -> Self {
        self.arg("--quiet").arg("--no-warnings")
    }

    /// Download only the video, never a playlist it belongs to.
    pub fn no_playlist(self) -> Self {
        self.arg("--no-playlist")
    }

    /// Keep going when single entries fail.
    pub fn ignore_errors(self) -> Self {
        self.arg("--ignore-errors")
    }

    /// Resolve metadata only.
    pub fn skip_download(self) -> Self {
        self.arg("--skip-download")
    }

    /// Write metadata next to the output as `<id>.info.json`.
    pub fn write_info_json(self) -> Self {
        self.arg("--write-info-json")
    }

    /// Write no metadata files for playlists or search result lists.
    pub fn no_write_playlist_metafiles(self) -> Self {
        self.arg("--no-write-playlist-metafiles")
    }

    /// Print metadata as one JSON object per line on stdout.
    pub fn dump_json(self) -> Self {
        self.arg("--dump-json")
    }

    /// Leave existing files untouched.
    pub fn no_overwrites(self) -> Self {
        self.arg("--no-overwrites")
    }

    /// Set format selector.
    pub fn format(self, selector: impl Into<String>) -> Self {
        self.arg("-f").arg(selector)
    }

    /// Convert the download to an audio-only file.
    pub fn extract_audio(self) -> Self {
        self.arg("--extract-audio")
    }

    /// Skip entries that do not pass a match filter.
    pub fn match_filter(self, filter: impl Into<String>) -> Self {
        self.arg("--match-filter").arg(filter)
    }

    /// The target this command runs against.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = self.args.clone();

        if let Some(template) = &self.output_template {
            args.push("-o".to_string());
            args.push(template.to_string_lossy().to_string());
        }

        if let Some(proxy) = &self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        // Target last, after `--` so phrases starting with '-' stay positional
        args.push("--".to_string());
        args.push(self.target.clone());

        args
    }
}

/// Runner for yt-dlp commands with a per-call timeout.
#[derive(Debug, Clone)]
pub struct YtDlpRunner {
    /// Resolved yt-dlp executable
    binary: PathBuf,
    /// Upper bound for one invocation
    timeout: Duration,
}

impl YtDlpRunner {
    /// Create a runner for an already resolved executable.
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Locate `binary` (a name on `PATH` or a path) and create a runner.
    pub fn locate(binary: &str, timeout: Duration) -> MediaResult<Self> {
        let path = which::which(binary).map_err(|_| MediaError::YtDlpNotFound(binary.to_string()))?;
        debug!(binary = %path.display(), "Located yt-dlp");
        Ok(Self::new(path, timeout))
    }

    /// Path of the executable this runner invokes.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Run a command and collect its output.
    ///
    /// A non-zero exit status is not an error here: yt-dlp with
    /// `--ignore-errors` exits non-zero when any single entry failed, and the
    /// caller decides what a partial result is worth. Exceeding the timeout
    /// kills the process and returns [`MediaError::Timeout`].
    pub async fn run(&self, cmd: &YtDlpCommand) -> MediaResult<Output> {
        let args = cmd.build_args();
        debug!("Running yt-dlp: {} {}", self.binary.display(), args.join(" "));

        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => Ok(output?),
            Err(_) => {
                warn!(
                    target_query = %cmd.target(),
                    "yt-dlp timed out after {} seconds, killing process",
                    self.timeout.as_secs()
                );
                Err(MediaError::Timeout(self.timeout.as_secs()))
            }
        }
    }
}

/// Last non-empty stderr line, which is where yt-dlp puts its `ERROR:` summary.
pub(crate) fn last_error_line(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("Unknown error")
        .trim()
        .to_string()
}

/// Whether stderr looks like YouTube throttling us.
pub(crate) fn is_rate_limited(stderr: &str) -> bool {
    stderr.contains("429")
        || stderr.contains("Too Many Requests")
        || stderr.contains("rate limit")
        || stderr.contains("Sign in to confirm")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_command_builder() {
        let cmd = YtDlpCommand::search(" tere hommikust \n", 3)
            .output_template("/tmp/x/%(id)s.%(ext)s")
            .no_playlist()
            .write_info_json()
            .no_write_playlist_metafiles()
            .skip_download()
            .proxy(Some("socks5://127.0.0.1:1080"));

        let args = cmd.build_args();
        assert_eq!(args.last().unwrap(), "ytsearch3:tere hommikust");
        assert_eq!(args[args.len() - 2], "--");
        assert!(args.contains(&"--write-info-json".to_string()));
        assert!(args.contains(&"--no-write-playlist-metafiles".to_string()));
        assert!(args.contains(&"--skip-download".to_string()));

        let proxy_pos = args.iter().position(|a| a == "--proxy").unwrap();
        assert_eq!(args[proxy_pos + 1], "socks5://127.0.0.1:1080");

        let out_pos = args.iter().position(|a| a == "-o").unwrap();
        assert_eq!(args[out_pos + 1], "/tmp/x/%(id)s.%(ext)s");
    }

    #[test]
    fn test_no_proxy_by_default() {
        let args = YtDlpCommand::new("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            .dump_json()
            .build_args();
        assert!(!args.contains(&"--proxy".to_string()));
        assert_eq!(args[0], "--dump-json");
    }

    #[test]
    fn test_last_error_line() {
        let stderr = "WARNING: something\nERROR: [youtube] abc: Video unavailable\n\n";
        assert_eq!(last_error_line(stderr), "ERROR: [youtube] abc: Video unavailable");
        assert_eq!(last_error_line(""), "Unknown error");
    }

    #[test]
    fn test_rate_limit_detection() {
        assert!(is_rate_limited("HTTP Error 429: Too Many Requests"));
        assert!(is_rate_limited("Sign in to confirm you're not a bot"));
        assert!(!is_rate_limited("ERROR: Video unavailable"));
    }

    #[test]
    fn test_locate_missing_binary() {
        let err = YtDlpRunner::locate("definitely-not-a-real-yt-dlp-binary", DEFAULT_CALL_TIMEOUT)
            .unwrap_err();
        assert!(matches!(err, MediaError::YtDlpNotFound(_)));
    }
}
