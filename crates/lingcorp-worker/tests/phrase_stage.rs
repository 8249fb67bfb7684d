use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

use lingcorp_worker::{
    generate_phrases, generate_phrases_batch, LanguageDetector, PhraseConfig, ValidationPolicy,
    Validator,
};

struct AlwaysEnglish;

impl LanguageDetector for AlwaysEnglish {
    fn detect(&self, _text: &str) -> Option<String> {
        Some("en".to_string())
    }
}

const CORPUS: &str = r#"{"title": "Foxes", "text": "The red fox runs across the frozen river at dawn."}
{"title": "Weather", "text": "Heavy rain falls over the quiet harbour town tonight."}
not json at all
{"title": "Numbers", "text": "Route 66 66 66 goes west"}
"#;

#[tokio::test]
async fn test_generate_phrases_writes_valid_unique_phrases() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("en_wiki.jsonl");
    tokio::fs::write(&corpus, CORPUS).await.unwrap();

    let config = PhraseConfig {
        output_dir: dir.path().join("out"),
        phrase_length: 3,
        document_limit: 10,
        document_top_phrases: 4,
    };
    let validator = Validator::new(ValidationPolicy::phrases(), Arc::new(AlwaysEnglish));

    let summary = generate_phrases(&corpus, &config, &validator, StdRng::seed_from_u64(1))
        .await
        .unwrap();

    assert_eq!(summary.language.as_str(), "en");
    assert_eq!(summary.documents, 3);
    assert!(summary.accepted > 0);
    assert_eq!(summary.output, dir.path().join("out").join("en_search_phrases.txt"));

    let content = tokio::fs::read_to_string(&summary.output).await.unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), summary.accepted);
    for line in &lines {
        let words: Vec<&str> = line.split_whitespace().collect();
        assert_eq!(words.len(), 3, "{}", line);
        assert!(words.iter().all(|w| !w.chars().all(char::is_numeric)));
    }
    let mut unique = lines.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), lines.len());
}

#[tokio::test]
async fn test_generate_phrases_replaces_previous_output() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("en_small.jsonl");
    tokio::fs::write(&corpus, r#"{"title": "", "text": "quiet harbour town"}"#)
        .await
        .unwrap();
    tokio::fs::write(dir.path().join("en_search_phrases.txt"), "stale phrase here\n")
        .await
        .unwrap();

    let config = PhraseConfig {
        output_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let validator = Validator::new(ValidationPolicy::phrases(), Arc::new(AlwaysEnglish));

    generate_phrases(&corpus, &config, &validator, StdRng::seed_from_u64(2))
        .await
        .unwrap();

    let content = tokio::fs::read_to_string(dir.path().join("en_search_phrases.txt"))
        .await
        .unwrap();
    assert_eq!(content, "quiet harbour town\n");
}

#[tokio::test]
async fn test_phrase_batch_records_missing_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let config = PhraseConfig {
        output_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let validator = Validator::new(ValidationPolicy::phrases(), Arc::new(AlwaysEnglish));

    let files = vec![dir.path().join("et_missing.jsonl")];
    let outcome = generate_phrases_batch(&files, &config, &validator).await;

    assert!(!outcome.is_success());
    assert!(outcome.summaries.is_empty());
}
