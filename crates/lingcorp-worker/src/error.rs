//! Worker error types.

use std::path::PathBuf;
use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors that end a run (or a whole batch).
///
/// Failures of a single candidate never show up here; they are
/// [`Skip`](crate::fetcher::Skip) values handled inside the loop.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Cannot read seeds from {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot append to {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid input file or directory: {0}")]
    InvalidInput(PathBuf),

    #[error("Input directory does not contain any files: {0}")]
    EmptyInputDirectory(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model error: {0}")]
    Model(#[from] lingcorp_models::ModelError),

    #[error("Media error: {0}")]
    Media(#[from] lingcorp_media::MediaError),

    #[error("Phrase extraction error: {0}")]
    Phrase(#[from] lingcorp_phrases::PhraseError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn source_unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SourceUnreadable {
            path: path.into(),
            source,
        }
    }

    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }
}
