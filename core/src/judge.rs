//! Relevance judging through an external, possibly unavailable, scoring service.
//!
//! The judge receives the query, the ground-truth list and the first [`MAX_JUDGED`]
//! candidates, and answers with a 0–3 score per candidate somewhere in its response text.
//! Any failure to get a usable verdict is reported as [`Judgement::Unavailable`];
//! [`RelevanceJudge::evaluate`] turns that into zero metrics so callers never fail on it.

use crate::cache::EvaluationCache;
use crate::error::JudgeError;
use crate::metrics::{self, MAX_SCORE};
use crate::types::{Book, CandidateResult, Metrics};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

/// Candidates beyond this rank are never shown to the judge.
pub const MAX_JUDGED: usize = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport to the scoring service: send a prompt, get its raw text answer.
#[async_trait]
pub trait JudgeBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}

#[derive(Debug)]
pub enum Judgement {
    Judged(Metrics),
    Cached(Metrics),
    Unavailable(JudgeError),
}

impl Judgement {
    /// Metrics for this outcome; an unavailable judge yields [`Metrics::zeroed`].
    pub fn into_metrics(self, ground_truth: &[Book]) -> Metrics {
        match self {
            Judgement::Judged(m) | Judgement::Cached(m) => m,
            Judgement::Unavailable(_) => Metrics::zeroed(ground_truth),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Judgement::Unavailable(_))
    }
}

#[derive(Debug, Deserialize)]
struct Verdict {
    scores: Vec<CandidateVerdict>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidateVerdict {
    #[serde(default, alias = "index")]
    ai_result_index: Option<usize>,
    #[serde(default)]
    relevance_score: Option<f64>,
}

pub struct RelevanceJudge {
    backend: Arc<dyn JudgeBackend>,
    cache: Arc<EvaluationCache>,
    timeout: Duration,
}

impl RelevanceJudge {
    pub fn new(backend: Arc<dyn JudgeBackend>, cache: Arc<EvaluationCache>) -> Self {
        Self { backend, cache, timeout: DEFAULT_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Score `candidates` against `ground_truth`, consulting the cache first. Successful
    /// verdicts are cached; failures are not.
    pub async fn judge(&self, query: &str, ground_truth: &[Book], candidates: &[CandidateResult]) -> Judgement {
        let key = EvaluationCache::key(query, ground_truth, candidates);
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(query, "using cached evaluation");
            return Judgement::Cached(hit);
        }
        // Nothing to score: every metric is zero without asking anyone.
        if candidates.is_empty() {
            return Judgement::Judged(metrics::compute(&[], ground_truth, candidates));
        }

        let judged = candidates.len().min(MAX_JUDGED);
        let prompt = build_prompt(query, ground_truth, &candidates[..judged]);
        let response = match tokio::time::timeout(self.timeout, self.backend.complete(&prompt)).await {
            Err(_) => return Judgement::Unavailable(JudgeError::Timeout(self.timeout)),
            Ok(Err(e)) => return Judgement::Unavailable(JudgeError::Transport(format!("{e:#}"))),
            Ok(Ok(text)) => text,
        };
        let scores = match parse_scores(&response, judged) {
            Ok(s) => s,
            Err(e) => return Judgement::Unavailable(e),
        };

        let result = metrics::compute(&scores, ground_truth, candidates);
        self.cache.insert(key, result.clone());
        Judgement::Judged(result)
    }

    /// Like [`judge`](Self::judge) but never fails: an unavailable judge yields zero metrics.
    pub async fn evaluate(&self, query: &str, ground_truth: &[Book], candidates: &[CandidateResult]) -> Metrics {
        let outcome = self.judge(query, ground_truth, candidates).await;
        if let Judgement::Unavailable(e) = &outcome {
            tracing::warn!(query, error = %e, "judge unavailable, using zero metrics");
        }
        outcome.into_metrics(ground_truth)
    }
}

pub fn build_prompt(query: &str, ground_truth: &[Book], candidates: &[CandidateResult]) -> String {
    let mut p = String::new();
    p.push_str(
        "You are an academic book search evaluation expert. Evaluate the relevance of AI search \
         results against ground truth recommendations.\n\n",
    );
    let _ = writeln!(p, "Query: \"{query}\"\n");
    p.push_str("Ground Truth Books:\n");
    for (i, b) in ground_truth.iter().enumerate() {
        let _ = writeln!(p, "{}. \"{}\" by {} ({})", i + 1, b.title, b.author, b.year);
    }
    p.push_str("\nAI Search Results:\n");
    for (i, c) in candidates.iter().take(MAX_JUDGED).enumerate() {
        let _ = writeln!(p, "{}. \"{}\" by {}", i + 1, c.title, c.author);
    }
    p.push_str(
        "\nTask: For each AI result, assign a relevance score (0-3) based on how well it matches \
         the ground truth:\n\
         - 0: Not relevant\n\
         - 1: Partially relevant (different topic but could be useful)\n\
         - 2: Highly relevant (similar topic/theme)\n\
         - 3: Exact/perfect match\n\n\
         Respond in JSON format:\n\
         {\n  \"scores\": [\n    {\"aiResultIndex\": 0, \"relevanceScore\": 2, \"reasoning\": \"Similar theme...\"},\n    ...\n  ]\n}",
    );
    p
}

/// First balanced `{...}` span in `text`. Braces inside JSON string literals do not count.
pub fn extract_payload(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Decode the judge's answer into scores aligned to the `judged` candidates. Entries
/// without an index are placed by position; indices past `judged` are ignored; missing
/// candidates score 0. Indices that are exactly `1..=n` are read as the 1-based numbering
/// the prompt lists candidates with.
pub fn parse_scores(response: &str, judged: usize) -> Result<Vec<u8>, JudgeError> {
    let payload = extract_payload(response)
        .ok_or_else(|| JudgeError::MalformedPayload("no JSON object in response".into()))?;
    let verdict: Verdict =
        serde_json::from_str(payload).map_err(|e| JudgeError::MalformedPayload(e.to_string()))?;

    let offset = usize::from(is_one_based(&verdict.scores));
    let mut scores = vec![0u8; judged];
    for (pos, entry) in verdict.scores.iter().enumerate() {
        let idx = entry.ai_result_index.map_or(pos, |i| i - offset);
        if let Some(slot) = scores.get_mut(idx) {
            let raw = entry.relevance_score.unwrap_or(0.0);
            *slot = raw.round().clamp(0.0, MAX_SCORE as f64) as u8;
        }
    }
    Ok(scores)
}

fn is_one_based(entries: &[CandidateVerdict]) -> bool {
    let mut seen: Vec<usize> = match entries.iter().map(|e| e.ai_result_index).collect::<Option<_>>() {
        Some(indices) => indices,
        None => return false,
    };
    seen.sort_unstable();
    !seen.is_empty() && seen.iter().copied().eq(1..=entries.len())
}
