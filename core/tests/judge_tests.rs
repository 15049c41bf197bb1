use async_trait::async_trait;
use evalcore::cache::EvaluationCache;
use evalcore::judge::{JudgeBackend, Judgement, RelevanceJudge};
use evalcore::metrics;
use evalcore::{Book, CandidateResult, JudgeError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct ScriptedJudge {
    reply: String,
    calls: AtomicUsize,
}

impl ScriptedJudge {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self { reply: reply.to_string(), calls: AtomicUsize::new(0) })
    }
}

#[async_trait]
impl JudgeBackend for ScriptedJudge {
    async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

struct SlowJudge;

#[async_trait]
impl JudgeBackend for SlowJudge {
    async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(r#"{"scores":[{"aiResultIndex":0,"relevanceScore":3}]}"#.into())
    }
}

struct BrokenJudge;

#[async_trait]
impl JudgeBackend for BrokenJudge {
    async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
        anyhow::bail!("connection refused")
    }
}

fn book(title: &str) -> Book {
    Book { title: title.into(), author: "author".into(), publisher: "pub".into(), year: "2000".into() }
}

fn candidate(id: u64, title: &str) -> CandidateResult {
    CandidateResult { id, title: title.into(), author: "someone".into(), similarity_score: 0.5 }
}

fn fixture() -> (Vec<Book>, Vec<CandidateResult>) {
    (
        vec![book("Cosmos"), book("The Selfish Gene"), book("Sapiens")],
        vec![candidate(10, "Pale Blue Dot"), candidate(11, "cosmos"), candidate(12, "Guns, Germs, and Steel")],
    )
}

const VERDICT: &str = r#"Here is my evaluation:
{"scores": [
  {"aiResultIndex": 0, "relevanceScore": 2, "reasoning": "same author {sort of}"},
  {"aiResultIndex": 1, "relevanceScore": 3, "reasoning": "exact"},
  {"aiResultIndex": 2, "relevanceScore": 1, "reasoning": "related"}
]}"#;

#[tokio::test]
async fn it_computes_metrics_from_a_verdict() {
    let (gt, cands) = fixture();
    let judge = RelevanceJudge::new(ScriptedJudge::new(VERDICT), Arc::new(EvaluationCache::new()));
    let m = judge.evaluate("space books", &gt, &cands).await;

    assert!((m.precision - 2.0 / 3.0).abs() < 1e-9);
    assert!((m.recall - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(m.mean_reciprocal_rank, 1.0);
    assert!((m.ndcg - metrics::ndcg(&[2, 3, 1])).abs() < 1e-12);

    assert_eq!(m.detailed_scores.len(), 3);
    assert_eq!(m.detailed_scores[0].ai_result_rank, Some(2));
    assert_eq!(m.detailed_scores[0].relevance_score, 3);
    assert_eq!(m.detailed_scores[1].ai_result_rank, None);
    assert_eq!(m.detailed_scores[1].relevance_score, 0);
    assert_eq!(m.detailed_scores[2].ground_truth_rank, 3);
}

#[tokio::test]
async fn it_calls_the_judge_once_per_key() {
    let (gt, cands) = fixture();
    let backend = ScriptedJudge::new(VERDICT);
    let cache = Arc::new(EvaluationCache::new());
    let judge = RelevanceJudge::new(backend.clone(), cache.clone());

    let first = judge.judge("space books", &gt, &cands).await;
    let second = judge.judge("space books", &gt, &cands).await;
    assert!(matches!(first, Judgement::Judged(_)));
    assert!(matches!(second, Judgement::Cached(_)));
    assert!(!second.is_unavailable());
    assert_eq!(first.into_metrics(&gt), second.into_metrics(&gt));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

    // a different candidate order is a different key
    let mut reordered = cands.clone();
    reordered.reverse();
    judge.evaluate("space books", &gt, &reordered).await;
    assert_eq!(backend.calls.load(Ordering::SeqCst), 2);

    cache.clear();
    judge.evaluate("space books", &gt, &cands).await;
    assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn it_falls_back_to_zero_metrics_on_timeout() {
    let (gt, cands) = fixture();
    let cache = Arc::new(EvaluationCache::new());
    let judge = RelevanceJudge::new(Arc::new(SlowJudge), cache.clone()).with_timeout(Duration::from_millis(20));

    let outcome = judge.judge("q", &gt, &cands).await;
    assert!(outcome.is_unavailable());
    assert!(matches!(outcome, Judgement::Unavailable(JudgeError::Timeout(_))));

    let m = outcome.into_metrics(&gt);
    assert_eq!((m.precision, m.recall, m.ndcg, m.mean_reciprocal_rank), (0.0, 0.0, 0.0, 0.0));
    assert_eq!(m.detailed_scores.len(), gt.len());
    assert!(m.detailed_scores.iter().all(|d| d.ai_result_rank.is_none() && d.relevance_score == 0));
    assert!(cache.is_empty(), "failures are not cached");
}

#[tokio::test]
async fn it_absorbs_transport_and_payload_failures() {
    let (gt, cands) = fixture();
    let cache = Arc::new(EvaluationCache::new());

    let broken = RelevanceJudge::new(Arc::new(BrokenJudge), cache.clone());
    assert!(matches!(broken.judge("q", &gt, &cands).await, Judgement::Unavailable(JudgeError::Transport(_))));

    let chatty = RelevanceJudge::new(ScriptedJudge::new("I think they are all great!"), cache.clone());
    let outcome = chatty.judge("q", &gt, &cands).await;
    assert!(matches!(outcome, Judgement::Unavailable(JudgeError::MalformedPayload(_))));

    let m = chatty.evaluate("q", &gt, &cands).await;
    assert_eq!(m, evalcore::Metrics::zeroed(&gt));
    assert!(cache.is_empty());
}

#[tokio::test]
async fn it_skips_the_judge_without_candidates() {
    let (gt, _) = fixture();
    let backend = ScriptedJudge::new(VERDICT);
    let judge = RelevanceJudge::new(backend.clone(), Arc::new(EvaluationCache::new()));
    let m = judge.evaluate("q", &gt, &[]).await;
    assert_eq!(m, evalcore::Metrics::zeroed(&gt));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn metric_bounds_hold_for_every_short_score_sequence() {
    // every sequence of length 0..=4 over 0..=3
    for len in 0..=4u32 {
        for code in 0..4usize.pow(len) {
            let mut c = code;
            let scores: Vec<u8> = (0..len).map(|_| { let s = (c % 4) as u8; c /= 4; s }).collect();

            let p = metrics::precision(&scores);
            let r = metrics::recall(&scores, 2);
            let n = metrics::ndcg(&scores);
            let rr = metrics::reciprocal_rank(&scores);
            assert!((0.0..=1.0).contains(&p), "{scores:?}");
            assert!((0.0..=1.0).contains(&r), "{scores:?}");
            assert!((0.0..=1.0).contains(&n), "{scores:?}");
            assert!(rr == 0.0 || (1..=4).any(|k| rr == 1.0 / k as f64), "{scores:?}");

            let sorted = scores.windows(2).all(|w| w[0] >= w[1]);
            let positive = scores.iter().any(|&s| s > 0);
            assert_eq!(n == 1.0, sorted && positive, "{scores:?}");

            assert_eq!(rr == 1.0, scores.first().is_some_and(|&s| s >= 2), "{scores:?}");
            assert_eq!(rr == 0.0, !scores.iter().any(|&s| s >= 2), "{scores:?}");
        }
    }
}
