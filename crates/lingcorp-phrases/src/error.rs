//! Error types for phrase extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for phrase extraction.
pub type PhraseResult<T> = Result<T, PhraseError>;

#[derive(Debug, Error)]
pub enum PhraseError {
    #[error("Cannot read corpus {path}: {source}")]
    CorpusUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid phrase length: {0}")]
    InvalidPhraseLength(usize),
}
