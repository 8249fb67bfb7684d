//! Random document sampling from a JSON-lines corpus.

use rand::Rng;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{PhraseError, PhraseResult};

/// One corpus record.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
}

impl Document {
    /// Title and body as one text.
    pub fn full_text(&self) -> String {
        format!("{}\n{}", self.title, self.text)
    }
}

/// Pick up to `count` random records from a JSON-lines corpus.
///
/// Every non-blank line has the same chance of being picked (reservoir
/// sampling, one pass). Picked lines that do not decode as a [`Document`]
/// are logged and dropped, so fewer than `count` texts may come back.
pub fn sample_documents<R: Rng>(
    path: impl AsRef<Path>,
    count: usize,
    rng: &mut R,
) -> PhraseResult<Vec<String>> {
    let path = path.as_ref();
    info!(count, corpus = %path.display(), "Selecting random documents");

    let unreadable = |source| PhraseError::CorpusUnreadable {
        path: path.to_path_buf(),
        source,
    };

    let reader = BufReader::new(File::open(path).map_err(unreadable)?);

    let mut reservoir: Vec<String> = Vec::with_capacity(count);
    let mut seen = 0usize;
    for line in reader.lines() {
        let line = line.map_err(unreadable)?;
        if line.trim().is_empty() {
            continue;
        }

        if reservoir.len() < count {
            reservoir.push(line);
        } else {
            let j = rng.random_range(0..=seen);
            if j < count {
                reservoir[j] = line;
            }
        }
        seen += 1;
    }

    let documents: Vec<String> = reservoir
        .iter()
        .enumerate()
        .filter_map(|(i, line)| match serde_json::from_str::<Document>(line) {
            Ok(doc) => Some(doc.full_text()),
            Err(e) => {
                warn!(sample = i, error = %e, "Skipping undecodable corpus record");
                None
            }
        })
        .collect();

    info!(
        sampled = documents.len(),
        corpus_records = seen,
        "Processed random documents"
    );
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;

    fn corpus(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_sample_all_when_count_exceeds_corpus() {
        let file = corpus(&[
            r#"{"title": "Tallinn", "text": "Pealinn"}"#,
            "",
            r#"{"title": "Tartu", "text": "Ülikoolilinn"}"#,
        ]);
        let mut rng = StdRng::seed_from_u64(1);

        let mut docs = sample_documents(file.path(), 10, &mut rng).unwrap();
        docs.sort();
        assert_eq!(docs, vec!["Tallinn\nPealinn", "Tartu\nÜlikoolilinn"]);
    }

    #[test]
    fn test_sample_is_bounded_and_drops_bad_records() {
        let lines: Vec<String> = (0..50)
            .map(|i| format!(r#"{{"title": "t{}", "text": "x"}}"#, i))
            .collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let file = corpus(&refs);
        let mut rng = StdRng::seed_from_u64(42);

        let docs = sample_documents(file.path(), 5, &mut rng).unwrap();
        assert_eq!(docs.len(), 5);

        let bad = corpus(&["not json", r#"{"title": "ok", "text": "fine"}"#]);
        let docs = sample_documents(bad.path(), 5, &mut rng).unwrap();
        assert_eq!(docs, vec!["ok\nfine"]);
    }

    #[test]
    fn test_missing_corpus() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = sample_documents("/nonexistent/corpus.jsonl", 3, &mut rng).unwrap_err();
        assert!(matches!(err, PhraseError::CorpusUnreadable { .. }));
    }
}
