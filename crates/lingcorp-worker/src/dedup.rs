//! In-run duplicate suppression.

use std::collections::HashSet;

/// Ids already accepted in the current run.
///
/// Grows monotonically and is never persisted; a new run (or a new language
/// in a directory batch) starts with an empty set.
#[derive(Debug, Default)]
pub struct DedupSet {
    seen: HashSet<String>,
}

impl DedupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` has not been recorded yet.
    pub fn should_accept(&self, id: &str) -> bool {
        !self.seen.contains(id)
    }

    /// Remember `id` as accepted.
    pub fn record(&mut self, id: &str) {
        self.seen.insert(id.to_string());
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_then_reject() {
        let mut dedup = DedupSet::new();
        assert!(dedup.should_accept("abc"));

        dedup.record("abc");
        assert!(!dedup.should_accept("abc"));
        assert!(dedup.should_accept("abd"));

        dedup.record("abc");
        assert_eq!(dedup.len(), 1);
    }
}
