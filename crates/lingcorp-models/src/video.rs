//! Video identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, ModelResult};

/// YouTube video ids are exactly this many characters.
const VIDEO_ID_LEN: usize = 11;

/// Base URL for single-video pages.
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// A bare YouTube video identifier (e.g. `dQw4w9WgXcQ`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Parse and validate a video id.
    pub fn parse(s: &str) -> ModelResult<Self> {
        let id = s.trim();

        if id.len() != VIDEO_ID_LEN || !is_valid_video_id_chars(id) {
            return Err(ModelError::InvalidVideoId(id.to_string()));
        }

        Ok(Self(id.to_string()))
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Page URL handed to the backend.
    pub fn watch_url(&self) -> String {
        format!("{}{}", WATCH_URL, self.0)
    }
}

impl FromStr for VideoId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Check if string contains only valid YouTube ID characters
fn is_valid_video_id_chars(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_ids() {
        assert_eq!(VideoId::parse("dQw4w9WgXcQ").unwrap().as_str(), "dQw4w9WgXcQ");
        assert_eq!(VideoId::parse(" a-b_c123XYZ\n").unwrap().as_str(), "a-b_c123XYZ");
    }

    #[test]
    fn test_parse_invalid_ids() {
        assert_eq!(
            VideoId::parse("abc123"),
            Err(ModelError::InvalidVideoId("abc123".to_string()))
        );
        assert!(VideoId::parse("abc123def!!").is_err());
        assert!(VideoId::parse("").is_err());
    }

    #[test]
    fn test_watch_url() {
        let id: VideoId = "dQw4w9WgXcQ".parse().unwrap();
        assert_eq!(id.watch_url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }
}
