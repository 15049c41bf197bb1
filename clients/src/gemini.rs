use crate::config::{JudgeConfig, USER_AGENT};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use evalcore::judge::JudgeBackend;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<PartIn<'a>>,
}

#[derive(Serialize)]
struct PartIn<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartOut>,
}

#[derive(Debug, Deserialize)]
struct PartOut {
    #[serde(default)]
    text: String,
}

/// Relevance judge backed by the Gemini `generateContent` endpoint.
pub struct GeminiJudge {
    client: Client,
    endpoint: Url,
    api_key: String,
    temperature: f32,
}

/// The key travels in a header so it never appears in a logged URL.
const API_KEY_HEADER: &str = "x-goog-api-key";

impl GeminiJudge {
    pub fn new(config: &JudgeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;
        let endpoint = Url::parse(&format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        ))
        .context("building gemini endpoint")?;
        Ok(Self { client, endpoint, api_key: config.api_key.clone(), temperature: config.temperature })
    }
}

#[async_trait]
impl JudgeBackend for GeminiJudge {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content { parts: vec![PartIn { text: prompt }] }],
            generation_config: GenerationConfig { temperature: self.temperature },
        };
        let resp: GenerateResponse = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        response_text(resp).ok_or_else(|| anyhow!("gemini returned no text"))
    }
}

fn response_text(resp: GenerateResponse) -> Option<String> {
    let content = resp.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().map(|p| p.text).collect();
    if text.is_empty() { None } else { Some(text) }
}
