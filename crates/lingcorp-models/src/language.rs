//! Language codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{ModelError, ModelResult};

/// Short identifier of the target language for one run (e.g. `"et"`).
///
/// Fixed for the whole run and derived once from the input file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Create from an existing string.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Derive the language code from an input file name.
    ///
    /// The code is the part of the file name before the first `_`, so
    /// `data/et_search_phrases.txt` yields `et`. A name without `_` is used
    /// whole.
    pub fn from_input_path(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ModelError::NoLanguageCode(path.to_path_buf()))?;

        let code = name.split('_').next().unwrap_or_default();
        if code.is_empty() {
            return Err(ModelError::NoLanguageCode(path.to_path_buf()));
        }

        Ok(Self(code.to_string()))
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a detected code names this language.
    pub fn matches(&self, detected: &str) -> bool {
        self.0 == detected
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LanguageCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
