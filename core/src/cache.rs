use crate::types::{Book, CandidateResult, Metrics};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;

/// Memoized judge verdicts keyed by query, ground-truth titles and candidate titles.
/// Entries live until [`EvaluationCache::clear`].
#[derive(Default)]
pub struct EvaluationCache {
    entries: RwLock<HashMap<String, Metrics>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

impl EvaluationCache {
    pub fn new() -> Self { Self::default() }

    pub fn key(query: &str, ground_truth: &[Book], candidates: &[CandidateResult]) -> String {
        let gt = ground_truth.iter().map(|b| b.title.as_str()).collect::<Vec<_>>().join("|");
        let cands = candidates.iter().map(|c| c.title.as_str()).collect::<Vec<_>>().join("|");
        format!("{query}|{gt}|{cands}")
    }

    pub fn get(&self, key: &str) -> Option<Metrics> {
        self.entries.read().get(key).cloned()
    }

    pub fn insert(&self, key: String, metrics: Metrics) {
        self.entries.write().insert(key, metrics);
    }

    pub fn len(&self) -> usize { self.entries.read().len() }

    pub fn is_empty(&self) -> bool { self.entries.read().is_empty() }

    /// Drop every entry, returning how many were removed.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let n = entries.len();
        entries.clear();
        tracing::info!(removed = n, "evaluation cache cleared");
        n
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        CacheStats { size: entries.len(), keys }
    }
}
