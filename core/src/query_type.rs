use serde::{Deserialize, Serialize};
use std::fmt;

/// Survey query category. The five canonical labels are fixed by the survey form; anything
/// that does not match one of them is carried verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QueryType {
    Research,
    MajorStudy,
    TopicInquiry,
    Literature,
    PersonalGrowth,
    Other(String),
}

impl QueryType {
    /// Canonical categories in match order.
    pub const CANONICAL: [QueryType; 5] = [
        QueryType::Research,
        QueryType::MajorStudy,
        QueryType::TopicInquiry,
        QueryType::Literature,
        QueryType::PersonalGrowth,
    ];

    pub fn label(&self) -> &str {
        match self {
            QueryType::Research => "🧑‍🔬 과제/연구 수행형",
            QueryType::MajorStudy => "📚 전공/심화 학습형",
            QueryType::TopicInquiry => "🌍 사회/문화/과학 주제 탐구형",
            QueryType::Literature => "🎨 문학/콘텐츠 추천형",
            QueryType::PersonalGrowth => "🧘 개인적 성장/문제 해결형",
            QueryType::Other(raw) => raw,
        }
    }

    pub fn is_canonical(&self) -> bool {
        !matches!(self, QueryType::Other(_))
    }
}

/// Map a free-text label onto a canonical category. A canonical label matches when either
/// string contains the other; otherwise the trimmed input is kept as `Other`.
///
/// An empty label is contained in every canonical label and therefore maps to the first one.
pub fn normalize(raw: &str) -> QueryType {
    let trimmed = raw.trim();
    QueryType::CANONICAL
        .iter()
        .find(|known| {
            let label = known.label();
            trimmed.contains(label) || label.contains(trimmed)
        })
        .cloned()
        .unwrap_or_else(|| QueryType::Other(trimmed.to_string()))
}

impl From<String> for QueryType {
    fn from(raw: String) -> Self {
        normalize(&raw)
    }
}

impl From<QueryType> for String {
    fn from(qt: QueryType) -> Self {
        match qt {
            QueryType::Other(raw) => raw,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
