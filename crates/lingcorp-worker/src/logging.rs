//! Structured run logging utilities.
//!
//! Provides consistent, structured logging for acquisition runs with
//! tracing spans and contextual information.

use serde::Serialize;
use std::fmt;

use tracing::{error, info, warn, Span};
use uuid::Uuid;

use lingcorp_models::LanguageCode;

/// Unique identifier for one run (one input file, one language).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Run logger for structured logging with consistent formatting.
///
/// Every line carries the run id, the language and the operation
/// (e.g. "video_search", "audio_download").
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: RunId,
    language: LanguageCode,
    operation: String,
}

impl RunLogger {
    pub fn new(language: &LanguageCode, operation: &str) -> Self {
        Self {
            run_id: RunId::new(),
            language: language.clone(),
            operation: operation.to_string(),
        }
    }

    /// Log the start of the run.
    pub fn log_start(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            language = %self.language,
            operation = %self.operation,
            "Run started: {}", message
        );
    }

    /// Log a progress update.
    pub fn log_progress(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            language = %self.language,
            operation = %self.operation,
            "Run progress: {}", message
        );
    }

    /// Log a warning.
    pub fn log_warning(&self, message: &str) {
        warn!(
            run_id = %self.run_id,
            language = %self.language,
            operation = %self.operation,
            "Run warning: {}", message
        );
    }

    /// Log an error.
    pub fn log_error(&self, message: &str) {
        error!(
            run_id = %self.run_id,
            language = %self.language,
            operation = %self.operation,
            "Run error: {}", message
        );
    }

    /// Log successful completion.
    pub fn log_completion(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            language = %self.language,
            operation = %self.operation,
            "Run completed: {}", message
        );
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn language(&self) -> &LanguageCode {
        &self.language
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Create a tracing span for this run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "run",
            run_id = %self.run_id,
            language = %self.language,
            operation = %self.operation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_logger_creation() {
        let lang = LanguageCode::new("et");
        let logger = RunLogger::new(&lang, "video_search");

        assert_eq!(logger.language(), &lang);
        assert_eq!(logger.operation(), "video_search");
    }

    #[test]
    fn test_run_ids_are_unique() {
        let lang = LanguageCode::new("et");
        let a = RunLogger::new(&lang, "x");
        let b = RunLogger::new(&lang, "x");
        assert_ne!(a.run_id(), b.run_id());
    }
}
