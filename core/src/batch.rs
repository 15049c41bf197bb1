use crate::error::EvalError;
use crate::judge::RelevanceJudge;
use crate::record::parse_survey;
use crate::search::SearchClient;
use crate::types::{AverageMetrics, BatchResult, QueryEvaluation, SurveyRecord};
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub const DEFAULT_LABEL: &str = "Batch Evaluation";

/// Runs every non-empty query of every record through search and judging, one at a time.
pub struct BatchOrchestrator {
    search: Arc<dyn SearchClient>,
    judge: RelevanceJudge,
}

impl BatchOrchestrator {
    pub fn new(search: Arc<dyn SearchClient>, judge: RelevanceJudge) -> Self {
        Self { search, judge }
    }

    /// Parse a survey export and evaluate it.
    pub async fn run_csv(&self, csv: &str) -> Result<BatchResult, EvalError> {
        if csv.trim().is_empty() {
            return Err(EvalError::EmptyInput);
        }
        let records = parse_survey(csv);
        if records.is_empty() {
            return Err(EvalError::NoValidEntries);
        }
        self.run(&records, DEFAULT_LABEL).await
    }

    pub async fn run(&self, records: &[SurveyRecord], label: &str) -> Result<BatchResult, EvalError> {
        if records.is_empty() {
            return Err(EvalError::NoValidEntries);
        }
        let mut evaluations = Vec::new();
        for record in records {
            tracing::info!(respondent = %record.respondent_name, "processing survey record");
            for (number, slot) in record.numbered_slots() {
                if slot.query.is_empty() {
                    tracing::debug!(query_number = number, "skipping empty query");
                    continue;
                }
                let candidates = match self.search.search(&slot.query).await {
                    Ok(c) => c,
                    Err(e) => {
                        tracing::error!(query_number = number, error = %e, "search failed, skipping query");
                        continue;
                    }
                };
                let metrics = self.judge.evaluate(&slot.query, &slot.ground_truth, &candidates).await;
                tracing::info!(query_number = number, precision = metrics.precision, "query evaluated");
                evaluations.push(QueryEvaluation {
                    query_id: number.to_string(),
                    query_number: number,
                    query: slot.query.clone(),
                    query_type: slot.query_type.clone(),
                    ground_truth: slot.ground_truth.clone(),
                    candidates,
                    metrics,
                });
            }
        }

        let average_metrics = AverageMetrics::from_evaluations(&evaluations)?;
        let now = OffsetDateTime::now_utc();
        let result = BatchResult {
            id: format!("batch_{}", now.unix_timestamp_nanos() / 1_000_000),
            label: label.to_string(),
            timestamp: now.format(&Rfc3339).unwrap_or_default(),
            evaluations,
            average_metrics,
        };
        tracing::info!(queries = result.evaluations.len(), "batch evaluation complete");
        Ok(result)
    }
}
