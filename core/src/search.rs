use crate::types::CandidateResult;
use async_trait::async_trait;

/// The search service under evaluation. Implementations should degrade an unsuccessful or
/// malformed response to an empty list; an `Err` is reserved for failures the caller
/// should log and skip.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &str) -> anyhow::Result<Vec<CandidateResult>>;
}
