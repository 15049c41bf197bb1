use crate::config::{SearchConfig, USER_AGENT};
use anyhow::Result;
use async_trait::async_trait;
use evalcore::search::SearchClient;
use evalcore::CandidateResult;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptRequest<'a> {
    prompt: &'a str,
    homepage_id: u32,
}

/// HTTP client for the search API being evaluated.
pub struct SearchApiClient {
    client: Client,
    endpoint: String,
    homepage_id: u32,
}

impl SearchApiClient {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/prompt", config.base_url.trim_end_matches('/')),
            homepage_id: config.homepage_id,
        })
    }
}

#[async_trait]
impl SearchClient for SearchApiClient {
    /// Transport errors, non-2xx statuses and undecodable bodies all yield no candidates.
    async fn search(&self, query: &str) -> Result<Vec<CandidateResult>> {
        let body = PromptRequest { prompt: query, homepage_id: self.homepage_id };
        let resp = match self.client.post(&self.endpoint).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "search request failed");
                return Ok(vec![]);
            }
        };
        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "search api error");
            return Ok(vec![]);
        }
        match resp.json::<Value>().await {
            Ok(json) => Ok(decode_results(&json)),
            Err(e) => {
                tracing::warn!(error = %e, "search response is not JSON");
                Ok(vec![])
            }
        }
    }
}

/// Read `results.book_results[]`. Missing or mistyped fields fall back to empty strings and
/// zero; entries that are not objects are skipped.
pub fn decode_results(json: &Value) -> Vec<CandidateResult> {
    let Some(items) = json.pointer("/results/book_results").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| CandidateResult {
            id: item.get("work_id").and_then(numeric_id).unwrap_or(0),
            title: first_text(item, &["work_title", "book_title"]),
            author: first_text(item, &["work_author", "book_author"]),
            similarity_score: item
                .get("similarity")
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
                .clamp(0.0, 1.0),
        })
        .collect()
}

/// Ids arrive as JSON numbers or as numeric strings.
fn numeric_id(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        other => other.as_u64(),
    }
}

fn first_text(item: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| item.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}
