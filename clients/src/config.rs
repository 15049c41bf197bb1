use anyhow::{bail, Context, Result};
use clap::Args;
use std::time::Duration;
use url::Url;

pub const DEFAULT_SEARCH_URL: &str = "http://115.145.129.143:40002/v1.0_beta";
pub const DEFAULT_GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const USER_AGENT: &str = concat!("book-search-eval/", env!("CARGO_PKG_VERSION"));

/// Collaborator settings shared by the server and the CLI.
#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
    /// Base URL of the search API under evaluation
    #[arg(long, env = "AI_SEARCH_API_URL", default_value = DEFAULT_SEARCH_URL)]
    pub search_url: String,
    /// Context identifier sent with every search request
    #[arg(long, env = "AI_SEARCH_HOMEPAGE_ID", default_value_t = 1)]
    pub homepage_id: u32,
    /// Search request timeout seconds
    #[arg(long, default_value_t = 30)]
    pub search_timeout_secs: u64,
    /// Gemini API key used by the relevance judge
    #[arg(long, env = "GEMINI_API_KEY", default_value = "", hide_env_values = true)]
    pub gemini_api_key: String,
    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub gemini_model: String,
    /// Sampling temperature for the judge (0-2)
    #[arg(long, env = "GEMINI_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)]
    pub gemini_temperature: f32,
    /// Gemini REST base URL
    #[arg(long, env = "GEMINI_API_BASE", default_value = DEFAULT_GEMINI_BASE)]
    pub gemini_base_url: String,
    /// Wall-clock budget for one judge call, in milliseconds
    #[arg(long, env = "JUDGE_TIMEOUT_MS", default_value_t = 30_000)]
    pub judge_timeout_ms: u64,
}

impl ServiceArgs {
    pub fn search_config(&self) -> Result<SearchConfig> {
        SearchConfig {
            base_url: self.search_url.clone(),
            homepage_id: self.homepage_id,
            timeout: Duration::from_secs(self.search_timeout_secs),
        }
        .validate()
    }

    pub fn judge_config(&self) -> Result<JudgeConfig> {
        JudgeConfig {
            api_key: self.gemini_api_key.clone(),
            model: self.gemini_model.clone(),
            temperature: self.gemini_temperature,
            base_url: self.gemini_base_url.clone(),
            timeout: Duration::from_millis(self.judge_timeout_ms),
        }
        .validate()
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub base_url: String,
    pub homepage_id: u32,
    pub timeout: Duration,
}

impl SearchConfig {
    pub fn validate(self) -> Result<Self> {
        Url::parse(&self.base_url).with_context(|| format!("invalid search url {}", self.base_url))?;
        Ok(self)
    }
}

#[derive(Debug, Clone)]
pub struct JudgeConfig {
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub base_url: String,
    pub timeout: Duration,
}

impl JudgeConfig {
    pub fn validate(self) -> Result<Self> {
        if self.api_key.is_empty() {
            bail!("GEMINI_API_KEY environment variable is not set");
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            bail!("Temperature must be between 0 and 2");
        }
        Url::parse(&self.base_url).with_context(|| format!("invalid judge url {}", self.base_url))?;
        Ok(self)
    }
}

/// Display name and one-line description for a known model.
pub fn describe_model(model: &str) -> (&str, &str) {
    match model {
        "gemini-2.0-flash" => ("Gemini 2.0 Flash", "Fastest model, optimized for speed with good quality"),
        "gemini-2.0-pro" => ("Gemini 2.0 Pro", "Most capable model for complex tasks"),
        other => (other, "Unknown model"),
    }
}
