//! Evaluation engine for book-recommendation search: survey parsing, relevance judging
//! and retrieval metrics.

mod error;
mod types;

pub mod batch;
pub mod books;
pub mod cache;
pub mod judge;
pub mod metrics;
pub mod query_type;
pub mod record;
pub mod search;
pub mod summary;

pub use error::{EvalError, JudgeError};
pub use query_type::QueryType;
pub use types::*;
