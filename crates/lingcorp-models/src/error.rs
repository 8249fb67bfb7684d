//! Error types for model construction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while building model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Cannot derive a language code from {0}")]
    NoLanguageCode(PathBuf),

    #[error("Invalid video id: {0}")]
    InvalidVideoId(String),
}
