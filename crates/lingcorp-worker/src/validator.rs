//! Candidate validation.
//!
//! Checks run in a fixed order and stop at the first failure:
//! duration bound, phrase structure, language. Which checks apply is set by
//! the [`ValidationPolicy`] of the stage.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use lingcorp_models::{CandidateItem, LanguageCode};

use crate::language::{strip_non_printable, LanguageDetector};

/// Which checks a stage applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationPolicy {
    /// Reject items without a duration or with `duration >= max` (seconds)
    pub max_duration: Option<u64>,
    /// Reject phrases with repeated or all-digit words
    pub phrase_structure: bool,
    /// Reject items whose text is not in the run language
    pub language: bool,
}

impl ValidationPolicy {
    /// Search phrases: structure and language.
    pub fn phrases() -> Self {
        Self {
            max_duration: None,
            phrase_structure: true,
            language: true,
        }
    }

    /// Search results: language only.
    pub fn search_results() -> Self {
        Self {
            max_duration: None,
            phrase_structure: false,
            language: true,
        }
    }

    /// Pre-vetted ids for download: duration bound only.
    pub fn downloads(max_duration: u64) -> Self {
        Self {
            max_duration: Some(max_duration),
            phrase_structure: false,
            language: false,
        }
    }
}

/// Why a candidate was turned down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    MissingDuration,
    TooLong { duration: u64, max: u64 },
    RepeatedWord(String),
    NumericWord(String),
    LanguageMismatch { detected: Option<String> },
}

impl RejectReason {
    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            RejectReason::MissingDuration => "missing_duration",
            RejectReason::TooLong { .. } => "too_long",
            RejectReason::RepeatedWord(_) => "repeated_word",
            RejectReason::NumericWord(_) => "numeric_word",
            RejectReason::LanguageMismatch { .. } => "language_mismatch",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingDuration => write!(f, "no duration reported"),
            RejectReason::TooLong { duration, max } => {
                write!(f, "duration {}s not below cap {}s", duration, max)
            }
            RejectReason::RepeatedWord(w) => write!(f, "repeated word '{}'", w),
            RejectReason::NumericWord(w) => write!(f, "numeric word '{}'", w),
            RejectReason::LanguageMismatch { detected } => write!(
                f,
                "detected language {}",
                detected.as_deref().unwrap_or("unknown")
            ),
        }
    }
}

/// Outcome of validating one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// Applies a [`ValidationPolicy`] to candidates.
#[derive(Clone)]
pub struct Validator {
    policy: ValidationPolicy,
    detector: Arc<dyn LanguageDetector>,
}

impl Validator {
    pub fn new(policy: ValidationPolicy, detector: Arc<dyn LanguageDetector>) -> Self {
        Self { policy, detector }
    }

    /// Shared handle to the detector, for building validators with another policy.
    pub fn detector(&self) -> Arc<dyn LanguageDetector> {
        Arc::clone(&self.detector)
    }

    /// Validate `item` against the run language.
    pub fn validate(&self, item: &CandidateItem, language: &LanguageCode) -> Verdict {
        let checks = self
            .check_duration(item)
            .and_then(|_| self.check_structure(item))
            .and_then(|_| self.check_language(item, language));

        match checks {
            Ok(()) => Verdict::Accept,
            Err(reason) => Verdict::Reject(reason),
        }
    }

    fn check_duration(&self, item: &CandidateItem) -> Result<(), RejectReason> {
        let Some(max) = self.policy.max_duration else {
            return Ok(());
        };
        match item.duration_seconds {
            None => Err(RejectReason::MissingDuration),
            Some(duration) if duration >= max => Err(RejectReason::TooLong { duration, max }),
            Some(_) => Ok(()),
        }
    }

    fn check_structure(&self, item: &CandidateItem) -> Result<(), RejectReason> {
        if !self.policy.phrase_structure {
            return Ok(());
        }
        check_phrase_structure(&item.language_text)
    }

    fn check_language(&self, item: &CandidateItem, language: &LanguageCode) -> Result<(), RejectReason> {
        if !self.policy.language {
            return Ok(());
        }
        let text = strip_non_printable(&item.language_text);
        let detected = self.detector.detect(&text);
        match detected {
            Some(code) if language.matches(&code) => Ok(()),
            detected => Err(RejectReason::LanguageMismatch { detected }),
        }
    }
}

/// Reject phrases with a repeated word (case-sensitive) or an all-digit word.
pub fn check_phrase_structure(phrase: &str) -> Result<(), RejectReason> {
    let mut seen = HashSet::new();
    for word in phrase.split_whitespace() {
        if !seen.insert(word) {
            return Err(RejectReason::RepeatedWord(word.to_string()));
        }
    }

    // Repeats are reported before digits: "1 1" is a repeated word
    for word in phrase.split_whitespace() {
        if word.chars().all(|c| c.is_ascii_digit()) {
            return Err(RejectReason::NumericWord(word.to_string()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Detector answering with a fixed code.
    struct FixedDetector(Option<&'static str>);

    impl LanguageDetector for FixedDetector {
        fn detect(&self, _text: &str) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    /// Detector answering with the text it was given.
    struct EchoDetector;

    impl LanguageDetector for EchoDetector {
        fn detect(&self, text: &str) -> Option<String> {
            Some(text.to_string())
        }
    }

    fn validator(policy: ValidationPolicy, code: Option<&'static str>) -> Validator {
        Validator::new(policy, Arc::new(FixedDetector(code)))
    }

    #[test]
    fn test_phrase_structure() {
        assert_eq!(
            check_phrase_structure("the cat the"),
            Err(RejectReason::RepeatedWord("the".to_string()))
        );
        assert_eq!(
            check_phrase_structure("12 34 56"),
            Err(RejectReason::NumericWord("12".to_string()))
        );
        assert_eq!(check_phrase_structure("red fox run"), Ok(()));
        // Numerals outside 0-9 are ordinary words
        assert_eq!(check_phrase_structure("Ⅻ century kings"), Ok(()));
        assert_eq!(check_phrase_structure("add ½ cup"), Ok(()));
        // Case-sensitive: "The" and "the" are different words
        assert_eq!(check_phrase_structure("The cat the"), Ok(()));
        assert_eq!(
            check_phrase_structure("route 66 west"),
            Err(RejectReason::NumericWord("66".to_string()))
        );
        // Mixed letters and digits are fine
        assert_eq!(check_phrase_structure("r2d2 droid film"), Ok(()));
    }

    #[test]
    fn test_structure_runs_before_language() {
        let v = validator(ValidationPolicy::phrases(), Some("en"));
        let lang = LanguageCode::new("en");

        assert!(v.validate(&CandidateItem::phrase("red fox run"), &lang).is_accept());
        assert_eq!(
            v.validate(&CandidateItem::phrase("the cat the"), &lang),
            Verdict::Reject(RejectReason::RepeatedWord("the".to_string()))
        );

        let wrong = validator(ValidationPolicy::phrases(), Some("de"));
        assert_eq!(
            wrong.validate(&CandidateItem::phrase("red fox run"), &lang),
            Verdict::Reject(RejectReason::LanguageMismatch {
                detected: Some("de".to_string())
            })
        );
    }

    #[test]
    fn test_unknown_language_rejected() {
        let v = validator(ValidationPolicy::search_results(), None);
        let item = CandidateItem::new("abc").with_language_text("???");
        assert_eq!(
            v.validate(&item, &LanguageCode::new("et")),
            Verdict::Reject(RejectReason::LanguageMismatch { detected: None })
        );
    }

    #[test]
    fn test_duration_bound() {
        // Language check is off for downloads, detector never consulted
        let v = validator(ValidationPolicy::downloads(3600), None);
        let lang = LanguageCode::new("et");

        assert!(v.validate(&CandidateItem::new("a").with_duration(1800), &lang).is_accept());
        assert_eq!(
            v.validate(&CandidateItem::new("b").with_duration(3600), &lang),
            Verdict::Reject(RejectReason::TooLong {
                duration: 3600,
                max: 3600
            })
        );
        assert_eq!(
            v.validate(&CandidateItem::new("c"), &lang),
            Verdict::Reject(RejectReason::MissingDuration)
        );
    }

    #[test]
    fn test_text_is_cleaned_before_detection() {
        let v = Validator::new(ValidationPolicy::search_results(), Arc::new(EchoDetector));
        let item = CandidateItem::new("abc").with_language_text("et\n");
        assert!(v.validate(&item, &LanguageCode::new("et")).is_accept());
    }

    #[test]
    fn test_reject_reason_labels() {
        assert_eq!(RejectReason::MissingDuration.label(), "missing_duration");
        assert_eq!(
            RejectReason::LanguageMismatch { detected: None }.to_string(),
            "detected language unknown"
        );
    }
}
