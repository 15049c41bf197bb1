//! Rank-aware retrieval metrics over judged relevance scores.
//!
//! Scores are integers in `0..=3`, aligned to candidate order (index 0 = rank 1). A
//! candidate counts as relevant when its score is at least [`RELEVANT_THRESHOLD`].

use crate::types::{Book, CandidateResult, DetailedScore, Metrics};

pub const MAX_SCORE: u8 = 3;
pub const RELEVANT_THRESHOLD: u8 = 2;

fn relevant_count(scores: &[u8]) -> usize {
    scores.iter().filter(|&&s| s >= RELEVANT_THRESHOLD).count()
}

/// Relevant candidates over candidates judged.
pub fn precision(scores: &[u8]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    relevant_count(scores) as f64 / scores.len() as f64
}

/// Relevant candidates over ground-truth size, capped at 1 when the judge marks more
/// candidates relevant than there are ground-truth books.
pub fn recall(scores: &[u8], ground_truth_count: usize) -> f64 {
    if ground_truth_count == 0 {
        return 0.0;
    }
    (relevant_count(scores) as f64 / ground_truth_count as f64).min(1.0)
}

/// DCG = Σ rel_i / log2(i + 2), i 0-based.
pub fn dcg(scores: &[u8]) -> f64 {
    scores
        .iter()
        .enumerate()
        .map(|(i, &s)| s as f64 / ((i + 2) as f64).log2())
        .sum()
}

pub fn ndcg(scores: &[u8]) -> f64 {
    let mut ideal = scores.to_vec();
    ideal.sort_unstable_by(|a, b| b.cmp(a));
    let idcg = dcg(&ideal);
    if idcg <= 0.0 {
        return 0.0;
    }
    (dcg(scores) / idcg).min(1.0)
}

/// 1 / rank of the first relevant candidate, 0 when none is relevant.
pub fn reciprocal_rank(scores: &[u8]) -> f64 {
    scores
        .iter()
        .position(|&s| s >= RELEVANT_THRESHOLD)
        .map(|i| 1.0 / (i + 1) as f64)
        .unwrap_or(0.0)
}

/// Index of the first candidate whose title contains, or is contained in, `title`
/// (case-insensitive). Candidates with an empty title never match.
pub fn matching_candidate(title: &str, candidates: &[CandidateResult]) -> Option<usize> {
    let wanted = title.to_lowercase();
    candidates.iter().position(|c| {
        let got = c.title.to_lowercase();
        !got.is_empty() && (got.contains(&wanted) || wanted.contains(&got))
    })
}

/// Per-ground-truth breakdown: where each book landed among the candidates and the score
/// the judge gave that candidate.
pub fn detailed_scores(scores: &[u8], ground_truth: &[Book], candidates: &[CandidateResult]) -> Vec<DetailedScore> {
    ground_truth
        .iter()
        .enumerate()
        .map(|(idx, book)| {
            let hit = matching_candidate(&book.title, candidates);
            DetailedScore {
                title: book.title.clone(),
                author: book.author.clone(),
                ground_truth_rank: idx + 1,
                ai_result_rank: hit.map(|i| i + 1),
                relevance_score: hit.and_then(|i| scores.get(i).copied()).unwrap_or(0),
            }
        })
        .collect()
}

/// Full metric set for one judged query. `scores` must already be aligned to the judged
/// candidates (at most the first ten).
pub fn compute(scores: &[u8], ground_truth: &[Book], candidates: &[CandidateResult]) -> Metrics {
    Metrics {
        precision: precision(scores),
        recall: recall(scores, ground_truth.len()),
        ndcg: ndcg(scores),
        mean_reciprocal_rank: reciprocal_rank(scores),
        detailed_scores: detailed_scores(scores, ground_truth, candidates),
    }
}
