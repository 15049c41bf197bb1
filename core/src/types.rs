use crate::error::EvalError;
use crate::query_type::QueryType;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_TITLE: &str = "(제목 없음)";
pub const UNKNOWN_AUTHOR: &str = "(저자 불명)";
pub const UNKNOWN_PUBLISHER: &str = "(출판사 불명)";
pub const UNKNOWN_YEAR: &str = "(연도 불명)";

/// One ground-truth citation. Fields are never empty: the extractor fills gaps with the
/// `UNKNOWN_*` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub year: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySlot {
    pub query: String,
    pub ground_truth: Vec<Book>, // order = rank
    pub query_type: QueryType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyRecord {
    pub timestamp: String,
    pub respondent_name: String,
    pub respondent_id: String,
    pub slots: [QuerySlot; 3],
}

impl SurveyRecord {
    /// Slots paired with their 1-based query number.
    pub fn numbered_slots(&self) -> impl Iterator<Item = (u8, &QuerySlot)> {
        self.slots.iter().enumerate().map(|(i, s)| (i as u8 + 1, s))
    }
}

/// A result returned by the search collaborator; rank = position + 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResult {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub similarity_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedScore {
    pub title: String,
    pub author: String,
    pub ground_truth_rank: usize,
    pub ai_result_rank: Option<usize>,
    pub relevance_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub precision: f64,
    pub recall: f64,
    pub ndcg: f64,
    pub mean_reciprocal_rank: f64,
    pub detailed_scores: Vec<DetailedScore>,
}

impl Metrics {
    /// The fallback used whenever the judge cannot produce a verdict: every metric is zero
    /// and each ground-truth book is listed as unmatched.
    pub fn zeroed(ground_truth: &[Book]) -> Self {
        let detailed_scores = ground_truth
            .iter()
            .enumerate()
            .map(|(idx, book)| DetailedScore {
                title: book.title.clone(),
                author: book.author.clone(),
                ground_truth_rank: idx + 1,
                ai_result_rank: None,
                relevance_score: 0,
            })
            .collect();
        Self { precision: 0.0, recall: 0.0, ndcg: 0.0, mean_reciprocal_rank: 0.0, detailed_scores }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryEvaluation {
    pub query_id: String,
    pub query_number: u8,
    pub query: String,
    pub query_type: QueryType,
    pub ground_truth: Vec<Book>,
    pub candidates: Vec<CandidateResult>,
    pub metrics: Metrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageMetrics {
    pub avg_precision: f64,
    pub avg_recall: f64,
    pub avg_ndcg: f64,
}

impl AverageMetrics {
    /// Arithmetic means over the evaluations. An empty slice has no mean and is an error.
    pub fn from_evaluations(evaluations: &[QueryEvaluation]) -> Result<Self, EvalError> {
        if evaluations.is_empty() {
            return Err(EvalError::NoEvaluations);
        }
        let n = evaluations.len() as f64;
        let mut avg = Self { avg_precision: 0.0, avg_recall: 0.0, avg_ndcg: 0.0 };
        for e in evaluations {
            avg.avg_precision += e.metrics.precision;
            avg.avg_recall += e.metrics.recall;
            avg.avg_ndcg += e.metrics.ndcg;
        }
        avg.avg_precision /= n;
        avg.avg_recall /= n;
        avg.avg_ndcg /= n;
        Ok(avg)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub id: String,
    pub label: String,
    pub timestamp: String,
    pub evaluations: Vec<QueryEvaluation>,
    pub average_metrics: AverageMetrics,
}
