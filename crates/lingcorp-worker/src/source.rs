//! Seed loading.

use rand::seq::SliceRandom;
use rand::Rng;
use std::path::Path;
use tracing::debug;

use lingcorp_models::Seed;

use crate::error::{WorkerError, WorkerResult};

/// Read seeds (one per line) from `path` and return them shuffled.
///
/// Lines are trimmed and blank lines dropped; duplicates are kept. The
/// permutation comes from `rng`, so callers pass entropy in production and
/// a seeded generator in tests.
pub async fn read_seeds<R: Rng>(path: impl AsRef<Path>, rng: &mut R) -> WorkerResult<Vec<Seed>> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| WorkerError::source_unreadable(path, e))?;

    let mut seeds: Vec<Seed> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Seed::new)
        .collect();

    seeds.shuffle(rng);

    debug!(path = %path.display(), seeds = seeds.len(), "Loaded seeds");
    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[tokio::test]
    async fn test_read_seeds_trims_and_keeps_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("et_search_phrases.txt");
        tokio::fs::write(&path, "  tere päevast \n\nhead aega\ntere päevast\n")
            .await
            .unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        let seeds = read_seeds(&path, &mut rng).await.unwrap();

        let mut texts: Vec<&str> = seeds.iter().map(Seed::as_str).collect();
        texts.sort();
        assert_eq!(texts, vec!["head aega", "tere päevast", "tere päevast"]);
    }

    #[tokio::test]
    async fn test_shuffle_is_reproducible_with_seeded_rng() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fi_video_ids.txt");
        let lines: Vec<String> = (0..20).map(|i| format!("seed{}", i)).collect();
        tokio::fs::write(&path, lines.join("\n")).await.unwrap();

        let a = read_seeds(&path, &mut StdRng::seed_from_u64(9)).await.unwrap();
        let b = read_seeds(&path, &mut StdRng::seed_from_u64(9)).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 20);
    }

    #[tokio::test]
    async fn test_unreadable_source() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = read_seeds("/nonexistent/et_x.txt", &mut rng).await.unwrap_err();
        assert!(matches!(err, WorkerError::SourceUnreadable { .. }));
    }
}
