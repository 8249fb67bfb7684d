//! Seeds and candidate items.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One input unit (a search phrase or a bare video id) driving one fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed(String);

impl Seed {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Seed {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One result returned by a fetch, subject to validation.
///
/// Transient: it is either persisted (as its `id`) or discarded once
/// validation is done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateItem {
    /// Identifier written to the output file
    pub id: String,
    /// Duration in whole seconds, when the backend reported one
    pub duration_seconds: Option<u64>,
    /// Text handed to the language detector
    pub language_text: String,
    /// Backend metadata, kept opaque
    #[serde(default)]
    pub raw_metadata: serde_json::Value,
}

impl CandidateItem {
    /// Create a candidate with no duration and no language text.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            duration_seconds: None,
            language_text: String::new(),
            raw_metadata: serde_json::Value::Null,
        }
    }

    /// A search phrase as a candidate: the phrase is both id and text.
    pub fn phrase(phrase: impl Into<String>) -> Self {
        let phrase = phrase.into();
        Self {
            language_text: phrase.clone(),
            ..Self::new(phrase)
        }
    }

    pub fn with_duration(mut self, seconds: u64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    pub fn with_language_text(mut self, text: impl Into<String>) -> Self {
        self.language_text = text.into();
        self
    }

    pub fn with_raw_metadata(mut self, raw: serde_json::Value) -> Self {
        self.raw_metadata = raw;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_candidate() {
        let item = CandidateItem::phrase("red fox run");
        assert_eq!(item.id, "red fox run");
        assert_eq!(item.language_text, "red fox run");
        assert_eq!(item.duration_seconds, None);
    }

    #[test]
    fn test_builder() {
        let item = CandidateItem::new("abc")
            .with_duration(90)
            .with_language_text("title description");
        assert_eq!(item.duration_seconds, Some(90));
        assert_eq!(item.language_text, "title description");
        assert!(item.raw_metadata.is_null());
    }
}
