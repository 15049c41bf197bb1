use async_trait::async_trait;
use evalcore::batch::BatchOrchestrator;
use evalcore::cache::EvaluationCache;
use evalcore::judge::{JudgeBackend, RelevanceJudge};
use evalcore::search::SearchClient;
use evalcore::summary::{self, BatchSummary};
use evalcore::{CandidateResult, EvalError, QueryType};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Returns one candidate titled after the query; fails for queries containing "boom".
struct EchoSearch {
    calls: AtomicUsize,
}

#[async_trait]
impl SearchClient for EchoSearch {
    async fn search(&self, query: &str) -> anyhow::Result<Vec<CandidateResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if query.contains("boom") {
            anyhow::bail!("search backend exploded");
        }
        Ok(vec![CandidateResult { id: 1, title: query.to_string(), author: "x".into(), similarity_score: 0.9 }])
    }
}

/// Scores the single candidate 3 when the prompt mentions "good", else 0.
struct KeywordJudge;

#[async_trait]
impl JudgeBackend for KeywordJudge {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let score = if prompt.contains("good") { 3 } else { 0 };
        Ok(format!(r#"{{"scores":[{{"aiResultIndex":0,"relevanceScore":{score}}}]}}"#))
    }
}

fn orchestrator() -> (BatchOrchestrator, Arc<EchoSearch>) {
    let search = Arc::new(EchoSearch { calls: AtomicUsize::new(0) });
    let judge = RelevanceJudge::new(Arc::new(KeywordJudge), Arc::new(EvaluationCache::new()));
    (BatchOrchestrator::new(search.clone(), judge), search)
}

fn line(q1: &str, q2: &str, q3: &str) -> String {
    format!("2024-01-01,Lee,2020123,{q1},\"1. <good book> / A / P / 2020\",{q2},,{q3},,📚 전공/심화 학습형,,🎨 문학/콘텐츠 추천형")
}

const HEADER: &str = "timestamp,name,id,q1,b1,q2,t2,q3,b3,t1,x,t3";

#[tokio::test]
async fn it_evaluates_non_empty_slots_in_order() {
    let (orch, search) = orchestrator();
    let csv = format!("{HEADER}\n{}\n{}\n", line("good book", "", "bad book"), line("", "boom", "good book"));
    let result = orch.run_csv(&csv).await.unwrap();

    // slot 2 of row 1 is empty, slot 2 of row 2 fails in search
    assert_eq!(search.calls.load(Ordering::SeqCst), 4);
    let numbers: Vec<u8> = result.evaluations.iter().map(|e| e.query_number).collect();
    assert_eq!(numbers, vec![1, 3, 3]);
    assert_eq!(result.evaluations[0].query_type, QueryType::MajorStudy);
    assert_eq!(result.evaluations[1].query_type, QueryType::Literature);
    assert_eq!(result.evaluations[0].query_id, "1");

    // precisions 1, 0, 1
    assert!((result.average_metrics.avg_precision - 2.0 / 3.0).abs() < 1e-9);
    assert!((result.average_metrics.avg_ndcg - 2.0 / 3.0).abs() < 1e-9);
    assert!(result.id.starts_with("batch_"));
    assert_eq!(result.label, "Batch Evaluation");

    let summary = BatchSummary::of(&result);
    assert_eq!(summary.queries, 3);
    assert_eq!(summary.type_counts, vec![(QueryType::MajorStudy, 1), (QueryType::Literature, 2)]);
    assert_eq!(summary::filter_by_type(&result.evaluations, Some(&QueryType::Literature)).len(), 2);
    assert_eq!(summary::filter_by_type(&result.evaluations, None).len(), 3);
}

#[tokio::test]
async fn it_rejects_a_batch_with_only_empty_queries() {
    let (orch, search) = orchestrator();
    let csv = format!("{HEADER}\n{}\n{}\n", line("", "", ""), line("", "", ""));
    assert_eq!(orch.run_csv(&csv).await.unwrap_err(), EvalError::NoEvaluations);
    assert_eq!(search.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn it_rejects_empty_and_unparseable_input() {
    let (orch, _) = orchestrator();
    assert_eq!(orch.run_csv("  ").await.unwrap_err(), EvalError::EmptyInput);
    assert_eq!(orch.run_csv(&format!("{HEADER}\na,b,c\n")).await.unwrap_err(), EvalError::NoValidEntries);
    assert_eq!(orch.run(&[], "x").await.unwrap_err(), EvalError::NoValidEntries);
}

#[tokio::test]
async fn it_rejects_a_batch_whose_every_search_fails() {
    let (orch, _) = orchestrator();
    let csv = format!("{HEADER}\n{}\n", line("boom", "boom again", ""));
    assert_eq!(orch.run_csv(&csv).await.unwrap_err(), EvalError::NoEvaluations);
}
