//! yt-dlp info-JSON metadata.

use serde::{Deserialize, Serialize};

use crate::error::{MediaError, MediaResult};

/// Metadata for one video as reported by yt-dlp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Video id
    pub id: String,
    /// Title (empty when missing)
    pub title: String,
    /// Description (empty when missing)
    pub description: String,
    /// Duration in seconds
    pub duration: Option<f64>,
    /// Whether the video is a live broadcast
    pub is_live: bool,
    /// Full metadata document
    pub raw: serde_json::Value,
}

/// Subset of the info JSON we read.
#[derive(Debug, Deserialize)]
struct InfoJson {
    #[serde(rename = "_type")]
    kind: Option<String>,
    id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    duration: Option<f64>,
    is_live: Option<bool>,
    live_status: Option<String>,
}

impl VideoInfo {
    /// Decode an info-JSON document.
    pub fn from_json_slice(bytes: &[u8]) -> MediaResult<Self> {
        let raw: serde_json::Value = serde_json::from_slice(bytes)?;
        Self::from_value(raw)
    }

    /// Decode from an already parsed JSON value.
    pub fn from_value(raw: serde_json::Value) -> MediaResult<Self> {
        let info: InfoJson = serde_json::from_value(raw.clone())?;

        // Playlists and search result lists carry an id of their own
        if let Some(kind) = info.kind.as_deref().filter(|k| *k != "video") {
            return Err(MediaError::invalid_metadata(format!(
                "not a video entry: {kind}"
            )));
        }

        let id = info
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| MediaError::invalid_metadata("missing video id"))?;

        let is_live = info.is_live.unwrap_or(false)
            || info.live_status.as_deref() == Some("is_live");

        Ok(Self {
            id,
            title: info.title.unwrap_or_default(),
            description: info.description.unwrap_or_default(),
            duration: info.duration,
            is_live,
            raw,
        })
    }

    /// Text used for language detection: trimmed title and description.
    pub fn language_text(&self) -> String {
        format!("{} {}", self.title.trim(), self.description.trim())
    }

    /// Duration rounded up to whole seconds.
    ///
    /// Rounding up keeps a 3599.5s video out of a `< 3600` cap.
    pub fn duration_seconds(&self) -> Option<u64> {
        self.duration
            .filter(|d| d.is_finite() && *d >= 0.0)
            .map(|d| d.ceil() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_info_json() {
        let json = br#"{
            "id": "dQw4w9WgXcQ",
            "title": "  Tere hommikust  ",
            "description": "Eesti keeles\n",
            "duration": 212,
            "is_live": false,
            "formats": []
        }"#;

        let info = VideoInfo::from_json_slice(json).unwrap();
        assert_eq!(info.id, "dQw4w9WgXcQ");
        assert_eq!(info.language_text(), "Tere hommikust Eesti keeles");
        assert_eq!(info.duration_seconds(), Some(212));
        assert!(!info.is_live);
        assert!(info.raw.get("formats").is_some());
    }

    #[test]
    fn test_live_and_missing_fields() {
        let info = VideoInfo::from_json_slice(br#"{"id": "abc", "live_status": "is_live"}"#).unwrap();
        assert!(info.is_live);
        assert_eq!(info.duration_seconds(), None);
        assert_eq!(info.language_text(), " ");
    }

    #[test]
    fn test_fractional_duration_rounds_up() {
        let info = VideoInfo::from_json_slice(br#"{"id": "abc", "duration": 3599.5}"#).unwrap();
        assert_eq!(info.duration_seconds(), Some(3600));
    }

    #[test]
    fn test_playlist_document_rejected() {
        let err = VideoInfo::from_json_slice(
            br#"{"_type": "playlist", "id": "tere maailm", "title": "tere maailm"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, MediaError::InvalidMetadata(_)));

        let info =
            VideoInfo::from_json_slice(br#"{"_type": "video", "id": "dQw4w9WgXcQ"}"#).unwrap();
        assert_eq!(info.id, "dQw4w9WgXcQ");
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            VideoInfo::from_json_slice(b"{not json"),
            Err(MediaError::JsonParse(_))
        ));
        assert!(matches!(
            VideoInfo::from_json_slice(br#"{"title": "no id"}"#),
            Err(MediaError::InvalidMetadata(_))
        ));
        assert!(matches!(
            VideoInfo::from_json_slice(br#"{"id": "abc", "duration": "long"}"#),
            Err(MediaError::JsonParse(_))
        ));
    }
}
