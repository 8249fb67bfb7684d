//! TF-IDF ranking of word n-grams.

use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::info;

use crate::error::{PhraseError, PhraseResult};

/// Tokens are runs of two or more word characters.
const TOKEN_PATTERN: &str = r"\b\w\w+\b";

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn token_regex() -> &'static Regex {
    TOKEN_RE.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token pattern is valid"))
}

/// Turns a batch of documents into candidate search phrases.
pub trait PhraseProducer {
    /// Produce candidate phrases, at most `top_phrases_per_document` per document.
    fn produce(&self, documents: &[String]) -> Vec<String>;
}

/// Ranks the word n-grams of each document by TF-IDF over the whole batch.
#[derive(Debug, Clone)]
pub struct TfidfPhraseProducer {
    phrase_length: usize,
    top_phrases_per_document: usize,
}

impl TfidfPhraseProducer {
    /// Create a producer for phrases of exactly `phrase_length` words.
    pub fn new(phrase_length: usize, top_phrases_per_document: usize) -> PhraseResult<Self> {
        if phrase_length == 0 {
            return Err(PhraseError::InvalidPhraseLength(phrase_length));
        }
        Ok(Self {
            phrase_length,
            top_phrases_per_document,
        })
    }

    /// Lowercased word n-grams of one document, with counts.
    fn term_counts(&self, document: &str) -> HashMap<String, u32> {
        let lowered = document.to_lowercase();
        let tokens: Vec<&str> = token_regex()
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .collect();

        let mut counts = HashMap::new();
        for window in tokens.windows(self.phrase_length) {
            *counts.entry(window.join(" ")).or_insert(0) += 1;
        }
        counts
    }
}

impl PhraseProducer for TfidfPhraseProducer {
    fn produce(&self, documents: &[String]) -> Vec<String> {
        info!(documents = documents.len(), "Generating search phrases");

        let counts: Vec<HashMap<String, u32>> =
            documents.iter().map(|d| self.term_counts(d)).collect();

        let mut document_frequency: HashMap<&str, u32> = HashMap::new();
        for doc in &counts {
            for term in doc.keys() {
                *document_frequency.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        // Smoothed idf: ln((1 + n) / (1 + df)) + 1
        let n = documents.len() as f64;
        let idf = |term: &str| {
            let df = document_frequency.get(term).copied().unwrap_or(0) as f64;
            ((1.0 + n) / (1.0 + df)).ln() + 1.0
        };

        let mut phrases = Vec::new();
        for doc in &counts {
            let mut scored: Vec<(&str, f64)> = doc
                .iter()
                .map(|(term, tf)| (term.as_str(), *tf as f64 * idf(term)))
                .collect();

            scored.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.0.cmp(b.0))
            });

            phrases.extend(
                scored
                    .into_iter()
                    .take(self.top_phrases_per_document)
                    .map(|(term, _)| term.to_string()),
            );
        }

        phrases
    }
}
