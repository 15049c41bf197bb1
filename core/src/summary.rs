use crate::metrics::RELEVANT_THRESHOLD;
use crate::query_type::QueryType;
use crate::types::{BatchResult, QueryEvaluation};
use serde::Serialize;

/// How the ground-truth books of a batch were scored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevanceDistribution {
    pub highly_relevant: usize,
    pub partially_relevant: usize,
    pub not_relevant: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub queries: usize,
    pub distribution: RelevanceDistribution,
    pub type_counts: Vec<(QueryType, usize)>,
    pub mean_reciprocal_rank: f64,
}

impl BatchSummary {
    pub fn of(result: &BatchResult) -> Self {
        Self {
            queries: result.evaluations.len(),
            distribution: relevance_distribution(&result.evaluations),
            type_counts: type_counts(&result.evaluations),
            mean_reciprocal_rank: mean_reciprocal_rank(&result.evaluations),
        }
    }
}

pub fn relevance_distribution(evaluations: &[QueryEvaluation]) -> RelevanceDistribution {
    let mut dist = RelevanceDistribution::default();
    for score in evaluations.iter().flat_map(|e| e.metrics.detailed_scores.iter()) {
        match score.relevance_score {
            s if s >= RELEVANT_THRESHOLD => dist.highly_relevant += 1,
            1 => dist.partially_relevant += 1,
            _ => dist.not_relevant += 1,
        }
    }
    dist
}

/// Evaluation count per query type, in first-seen order.
pub fn type_counts(evaluations: &[QueryEvaluation]) -> Vec<(QueryType, usize)> {
    let mut counts: Vec<(QueryType, usize)> = Vec::new();
    for e in evaluations {
        match counts.iter_mut().find(|(t, _)| *t == e.query_type) {
            Some((_, n)) => *n += 1,
            None => counts.push((e.query_type.clone(), 1)),
        }
    }
    counts
}

/// Evaluations of one type; `None` selects all.
pub fn filter_by_type<'a>(evaluations: &'a [QueryEvaluation], wanted: Option<&QueryType>) -> Vec<&'a QueryEvaluation> {
    evaluations
        .iter()
        .filter(|e| wanted.map_or(true, |t| e.query_type == *t))
        .collect()
}

pub fn mean_reciprocal_rank(evaluations: &[QueryEvaluation]) -> f64 {
    if evaluations.is_empty() {
        return 0.0;
    }
    evaluations.iter().map(|e| e.metrics.mean_reciprocal_rank).sum::<f64>() / evaluations.len() as f64
}
