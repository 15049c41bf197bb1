//! HTTP collaborators of the evaluation engine: the search API under test and the Gemini
//! relevance judge.

pub mod config;
pub mod gemini;
pub mod search;

pub use config::{JudgeConfig, SearchConfig, ServiceArgs};
pub use gemini::GeminiJudge;
pub use search::SearchApiClient;
