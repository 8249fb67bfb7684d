//! Output file naming.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::language::LanguageCode;

/// Kind of identifier list written by a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// Validated search phrases
    SearchPhrases,
    /// Video ids whose metadata matched the language
    VideoIds,
    /// Video ids whose audio was downloaded
    DownloadedIds,
}

impl OutputKind {
    /// File name suffix for this kind.
    pub fn suffix(&self) -> &'static str {
        match self {
            OutputKind::SearchPhrases => "search_phrases",
            OutputKind::VideoIds => "video_ids",
            OutputKind::DownloadedIds => "downloaded_ids",
        }
    }

    /// File name for a language: `<language>_<suffix>.txt`.
    pub fn file_name(&self, language: &LanguageCode) -> String {
        format!("{}_{}.txt", language, self.suffix())
    }

    /// Full output path inside `dir`.
    pub fn path_in(&self, dir: impl AsRef<Path>, language: &LanguageCode) -> PathBuf {
        dir.as_ref().join(self.file_name(language))
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}
