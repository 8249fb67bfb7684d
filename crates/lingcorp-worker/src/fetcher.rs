//! Candidate fetching.
//!
//! Both stages pull candidates through [`ItemFetcher`]:
//! - [`SearchFetcher`]: phrase → up to N search results with metadata
//! - [`DirectFetcher`]: video id → its metadata, then an audio download
//!   once the candidate passed validation
//!
//! Failures are reported as [`Skip`] values and never abort the loop.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

use lingcorp_media::{MediaResult, VideoInfo, YtDlp};
use lingcorp_models::{CandidateItem, LanguageCode, Seed, VideoId};

/// Per-run values a fetcher may need.
#[derive(Debug, Clone)]
pub struct FetchContext {
    pub language: LanguageCode,
    pub output_dir: PathBuf,
}

impl FetchContext {
    pub fn new(language: LanguageCode, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            language,
            output_dir: output_dir.into(),
        }
    }

    /// Directory for media files of this language (`<output>/<lang>`).
    pub fn media_dir(&self) -> PathBuf {
        self.output_dir.join(self.language.as_str())
    }
}

/// A seed or candidate dropped because the backend failed on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    /// Seed or item id the failure concerns
    pub subject: String,
    /// What went wrong
    pub reason: String,
}

impl Skip {
    pub fn new(subject: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self {
            subject: subject.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.reason)
    }
}

/// One fetch attempt for one candidate.
pub type Fetched = Result<CandidateItem, Skip>;

/// Source of candidate items.
#[async_trait]
pub trait ItemFetcher: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Fetch candidates for one seed.
    ///
    /// `Err` means the whole seed failed (zero candidates); an `Err` inside
    /// the list drops that one candidate only.
    async fn fetch(&self, seed: &Seed, ctx: &FetchContext) -> Result<Vec<Fetched>, Skip>;

    /// Finish acquiring a validated, not yet seen candidate.
    ///
    /// A candidate only counts once this succeeds.
    async fn commit(&self, _item: &CandidateItem, _ctx: &FetchContext) -> Result<(), Skip> {
        Ok(())
    }
}

/// Build a candidate from backend metadata.
pub fn candidate_from_info(info: VideoInfo) -> CandidateItem {
    let mut item = CandidateItem::new(info.id.clone()).with_language_text(info.language_text());
    item.duration_seconds = info.duration_seconds();
    item.with_raw_metadata(info.raw)
}

/// Turn one search result into a candidate; results without a valid video
/// id are skipped.
fn search_candidate(seed: &Seed, result: MediaResult<VideoInfo>) -> Fetched {
    let info = result.map_err(|e| Skip::new(seed.as_str(), e))?;
    VideoId::parse(&info.id).map_err(|e| Skip::new(seed.as_str(), e))?;
    Ok(candidate_from_info(info))
}

/// Phrase → videos via search.
#[derive(Debug, Clone)]
pub struct SearchFetcher {
    backend: YtDlp,
    videos_per_phrase: u32,
}

impl SearchFetcher {
    pub fn new(backend: YtDlp, videos_per_phrase: u32) -> Self {
        Self {
            backend,
            videos_per_phrase,
        }
    }
}

#[async_trait]
impl ItemFetcher for SearchFetcher {
    fn name(&self) -> &str {
        "search"
    }

    async fn fetch(&self, seed: &Seed, _ctx: &FetchContext) -> Result<Vec<Fetched>, Skip> {
        let results = self
            .backend
            .search(seed.as_str(), self.videos_per_phrase)
            .await
            .map_err(|e| Skip::new(seed.as_str(), e))?;

        Ok(results
            .into_iter()
            .map(|result| search_candidate(seed, result))
            .collect())
    }
}

/// Known video id → metadata, downloaded on commit.
#[derive(Debug, Clone)]
pub struct DirectFetcher {
    backend: YtDlp,
}

impl DirectFetcher {
    pub fn new(backend: YtDlp) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl ItemFetcher for DirectFetcher {
    fn name(&self) -> &str {
        "direct"
    }

    async fn fetch(&self, seed: &Seed, _ctx: &FetchContext) -> Result<Vec<Fetched>, Skip> {
        let id = VideoId::parse(seed.as_str()).map_err(|e| Skip::new(seed.as_str(), e))?;

        let info = self
            .backend
            .probe(&id)
            .await
            .map_err(|e| Skip::new(seed.as_str(), e))?;

        match info {
            None => {
                debug!(video_id = %id, "No metadata returned");
                Ok(Vec::new())
            }
            Some(info) if info.is_live => {
                debug!(video_id = %id, "Skipping live broadcast");
                Ok(Vec::new())
            }
            Some(info) => Ok(vec![Ok(candidate_from_info(info))]),
        }
    }

    async fn commit(&self, item: &CandidateItem, ctx: &FetchContext) -> Result<(), Skip> {
        let id = VideoId::parse(&item.id).map_err(|e| Skip::new(item.id.as_str(), e))?;
        self.backend
            .download_audio(&id, ctx.media_dir())
            .await
            .map(|_| ())
            .map_err(|e| Skip::new(item.id.as_str(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_from_info() {
        let info = VideoInfo::from_json_slice(
            br#"{"id": "dQw4w9WgXcQ", "title": "Tere ", "description": " maailm", "duration": 59.2}"#,
        )
        .unwrap();

        let item = candidate_from_info(info);
        assert_eq!(item.id, "dQw4w9WgXcQ");
        assert_eq!(item.duration_seconds, Some(60));
        assert_eq!(item.language_text, "Tere maailm");
        assert_eq!(item.raw_metadata["title"], "Tere ");
    }

    #[test]
    fn test_search_result_without_video_id_is_skipped() {
        let seed = Seed::new("tere maailm");
        let info = VideoInfo::from_json_slice(br#"{"id": "tere maailm", "title": "tere maailm"}"#)
            .unwrap();

        let skip = search_candidate(&seed, Ok(info)).unwrap_err();
        assert_eq!(skip.subject, "tere maailm");

        let info = VideoInfo::from_json_slice(br#"{"id": "dQw4w9WgXcQ"}"#).unwrap();
        assert_eq!(search_candidate(&seed, Ok(info)).unwrap().id, "dQw4w9WgXcQ");
    }

    #[test]
    fn test_media_dir() {
        let ctx = FetchContext::new(LanguageCode::new("et"), "/data/out");
        assert_eq!(ctx.media_dir(), PathBuf::from("/data/out/et"));
    }

    #[test]
    fn test_skip_display() {
        let skip = Skip::new("tere päevast", "timed out");
        assert_eq!(skip.to_string(), "tere päevast: timed out");
    }
}
