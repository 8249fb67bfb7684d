//! Corpus → search phrases.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, Instrument};

use lingcorp_models::{CandidateItem, LanguageCode, OutputKind};
use lingcorp_phrases::{sample_documents, PhraseError, PhraseProducer, TfidfPhraseProducer};

use crate::batch::BatchOutcome;
use crate::config::PhraseConfig;
use crate::dedup::DedupSet;
use crate::error::WorkerResult;
use crate::logging::{RunId, RunLogger};
use crate::persister::Persister;
use crate::validator::{ValidationPolicy, Validator, Verdict};

/// Outcome of one phrase run.
#[derive(Debug, Clone, Serialize)]
pub struct PhraseSummary {
    pub run_id: RunId,
    pub language: LanguageCode,
    pub documents: usize,
    /// Phrases produced before validation
    pub candidates: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub duplicates: usize,
    pub output: PathBuf,
}

/// Sample the corpus, rank phrases and write the valid ones to
/// `<output>/<lang>_search_phrases.txt`, replacing earlier content.
pub async fn generate_phrases<R>(
    corpus: &Path,
    config: &PhraseConfig,
    validator: &Validator,
    rng: R,
) -> WorkerResult<PhraseSummary>
where
    R: Rng + Send + 'static,
{
    let language = LanguageCode::from_input_path(corpus)?;
    let logger = RunLogger::new(&language, "phrase_generation");
    let span = logger.create_span();

    produce_and_write(corpus, config, validator, rng, &logger)
        .instrument(span)
        .await
}

async fn produce_and_write<R>(
    corpus: &Path,
    config: &PhraseConfig,
    validator: &Validator,
    rng: R,
    logger: &RunLogger,
) -> WorkerResult<PhraseSummary>
where
    R: Rng + Send + 'static,
{
    let language = logger.language().clone();
    logger.log_start(&format!(
        "{} documents from {}, {} phrases of {} words each",
        config.document_limit,
        corpus.display(),
        config.document_top_phrases,
        config.phrase_length
    ));

    let producer = TfidfPhraseProducer::new(config.phrase_length, config.document_top_phrases)?;
    let phrase_validator = Validator::new(ValidationPolicy::phrases(), validator.detector());

    // Sampling, ranking and detection are CPU-bound
    let path = corpus.to_path_buf();
    let limit = config.document_limit;
    let lang = language.clone();
    let selection = tokio::task::spawn_blocking(move || {
        let mut rng = rng;
        let documents = sample_documents(&path, limit, &mut rng)?;
        let phrases = producer.produce(&documents);
        Ok::<_, PhraseError>(select_phrases(
            documents.len(),
            phrases,
            &phrase_validator,
            &lang,
        ))
    })
    .await??;

    let persister = Persister::new(&config.output_dir, &language, OutputKind::SearchPhrases);
    persister.replace(&selection.accepted).await.inspect_err(|e| {
        logger.log_error(&e.to_string());
    })?;

    let summary = PhraseSummary {
        run_id: logger.run_id(),
        language,
        documents: selection.documents,
        candidates: selection.candidates,
        accepted: selection.accepted.len(),
        rejected: selection.rejected,
        duplicates: selection.duplicates,
        output: persister.path().to_path_buf(),
    };

    logger.log_completion(&format!(
        "{} of {} phrases kept ({} rejected, {} duplicates), written to {}",
        summary.accepted,
        summary.candidates,
        summary.rejected,
        summary.duplicates,
        summary.output.display()
    ));
    Ok(summary)
}

/// Generate phrases for every corpus file in order.
pub async fn generate_phrases_batch(
    files: &[PathBuf],
    config: &PhraseConfig,
    validator: &Validator,
) -> BatchOutcome<PhraseSummary> {
    let mut outcome = BatchOutcome::default();
    for path in files {
        info!(corpus = %path.display(), "Processing corpus file");
        let result = generate_phrases(path, config, validator, StdRng::from_os_rng()).await;
        outcome.record(path, result);
    }
    outcome
}

struct Selection {
    documents: usize,
    candidates: usize,
    accepted: Vec<String>,
    rejected: usize,
    duplicates: usize,
}

/// Keep valid, first-seen phrases in production order.
fn select_phrases(
    documents: usize,
    phrases: Vec<String>,
    validator: &Validator,
    language: &LanguageCode,
) -> Selection {
    let mut dedup = DedupSet::new();
    let mut selection = Selection {
        documents,
        candidates: phrases.len(),
        accepted: Vec::new(),
        rejected: 0,
        duplicates: 0,
    };

    for phrase in phrases {
        let item = CandidateItem::phrase(phrase);
        if let Verdict::Reject(reason) = validator.validate(&item, language) {
            debug!(phrase = %item.id, reason = %reason, "Phrase rejected");
            selection.rejected += 1;
            continue;
        }
        if !dedup.should_accept(&item.id) {
            selection.duplicates += 1;
            continue;
        }
        dedup.record(&item.id);
        selection.accepted.push(item.id);
    }

    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageDetector;
    use std::sync::Arc;

    struct AlwaysEnglish;

    impl LanguageDetector for AlwaysEnglish {
        fn detect(&self, _text: &str) -> Option<String> {
            Some("en".to_string())
        }
    }

    #[test]
    fn test_select_phrases() {
        let validator = Validator::new(ValidationPolicy::phrases(), Arc::new(AlwaysEnglish));
        let phrases = vec![
            "red fox run".to_string(),
            "the cat the".to_string(),
            "12 34 56".to_string(),
            "red fox run".to_string(),
            "blue sky day".to_string(),
        ];

        let selection = select_phrases(2, phrases, &validator, &LanguageCode::new("en"));
        assert_eq!(selection.accepted, vec!["red fox run", "blue sky day"]);
        assert_eq!(selection.rejected, 2);
        assert_eq!(selection.duplicates, 1);
        assert_eq!(selection.candidates, 5);
    }
}
