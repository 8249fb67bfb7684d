//! Durable id lists.

use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use lingcorp_models::{LanguageCode, OutputKind};

use crate::error::{WorkerError, WorkerResult};

/// Appends accepted ids to `<output>/<lang>_<kind>.txt`, one per line.
///
/// The file is opened per batch and synced before [`Persister::append`]
/// returns, so ids written before a crash stay on disk.
#[derive(Debug, Clone)]
pub struct Persister {
    path: PathBuf,
}

impl Persister {
    pub fn new(output_dir: impl AsRef<Path>, language: &LanguageCode, kind: OutputKind) -> Self {
        Self {
            path: kind.path_in(output_dir.as_ref(), language),
        }
    }

    /// Persist to an explicit file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `ids` in order. An empty batch still creates the file.
    pub async fn append(&self, ids: &[String]) -> WorkerResult<()> {
        let fail = |e| WorkerError::persistence(&self.path, e);

        self.create_parent().await?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(fail)?;

        file.write_all(encode_lines(ids).as_bytes()).await.map_err(fail)?;
        file.flush().await.map_err(fail)?;
        file.sync_data().await.map_err(fail)?;

        debug!(path = %self.path.display(), count = ids.len(), "Appended ids");
        Ok(())
    }

    /// Replace the file with `lines`.
    ///
    /// The new content is written to a sibling temporary file and renamed
    /// over the target, so a failed write leaves the previous file intact.
    pub async fn replace(&self, lines: &[String]) -> WorkerResult<()> {
        let fail = |e| WorkerError::persistence(&self.path, e);
        let staging = self.staging_path();

        self.create_parent().await?;
        let written = async {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&staging)
                .await?;
            file.write_all(encode_lines(lines).as_bytes()).await?;
            file.flush().await?;
            file.sync_data().await?;
            tokio::fs::rename(&staging, &self.path).await
        }
        .await;

        if let Err(e) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&staging).await {
                debug!(path = %staging.display(), error = %cleanup, "Staging file not removed");
            }
            return Err(fail(e));
        }

        debug!(path = %self.path.display(), count = lines.len(), "Replaced file");
        Ok(())
    }

    async fn create_parent(&self) -> WorkerResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| WorkerError::persistence(&self.path, e))?;
            }
        }
        Ok(())
    }

    /// `<file>.tmp` next to the target.
    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn encode_lines(lines: &[String]) -> String {
    let mut buf = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        buf.push_str(line);
        buf.push('\n');
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_accumulates_across_batches() {
        let dir = tempfile::tempdir().unwrap();
        let persister = Persister::new(dir.path(), &LanguageCode::new("et"), OutputKind::VideoIds);
        assert!(persister.path().ends_with("et_video_ids.txt"));

        persister.append(&["aaaaaaaaaaa".to_string()]).await.unwrap();
        persister.append(&[]).await.unwrap();
        persister
            .append(&["bbbbbbbbbbb".to_string(), "ccccccccccc".to_string()])
            .await
            .unwrap();

        let content = tokio::fs::read_to_string(persister.path()).await.unwrap();
        assert_eq!(content, "aaaaaaaaaaa\nbbbbbbbbbbb\nccccccccccc\n");
    }

    #[tokio::test]
    async fn test_append_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("lists");
        let persister = Persister::new(&nested, &LanguageCode::new("fi"), OutputKind::DownloadedIds);

        persister.append(&[]).await.unwrap();
        assert!(nested.join("fi_downloaded_ids.txt").exists());
    }

    #[tokio::test]
    async fn test_replace_discards_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let persister = Persister::at(dir.path().join("et_search_phrases.txt"));

        persister.append(&["old phrase".to_string()]).await.unwrap();
        persister.replace(&["new phrase".to_string()]).await.unwrap();

        let content = tokio::fs::read_to_string(persister.path()).await.unwrap();
        assert_eq!(content, "new phrase\n");
        assert!(!dir.path().join("et_search_phrases.txt.tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_replace_keeps_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let persister = Persister::at(dir.path().join("et_search_phrases.txt"));
        persister.append(&["old phrase".to_string()]).await.unwrap();

        // The staging file cannot be created
        std::fs::create_dir(dir.path().join("et_search_phrases.txt.tmp")).unwrap();

        let err = persister.replace(&["new phrase".to_string()]).await.unwrap_err();
        assert!(matches!(err, WorkerError::Persistence { .. }));

        let content = tokio::fs::read_to_string(persister.path()).await.unwrap();
        assert_eq!(content, "old phrase\n");
    }

    #[tokio::test]
    async fn test_unwritable_target() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be
        let path = dir.path().join("et_video_ids.txt");
        std::fs::create_dir(&path).unwrap();

        let err = Persister::at(&path).append(&["x".to_string()]).await.unwrap_err();
        assert!(matches!(err, WorkerError::Persistence { .. }));
    }
}
