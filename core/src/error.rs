use std::time::Duration;
use thiserror::Error;

/// Request-level failures: the batch produced nothing worth returning.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("CSV content required")]
    EmptyInput,
    #[error("No valid entries in CSV")]
    NoValidEntries,
    #[error("No queries could be evaluated")]
    NoEvaluations,
}

/// Why the relevance judge could not produce a verdict.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("judge timed out after {0:?}")]
    Timeout(Duration),
    #[error("judge transport error: {0}")]
    Transport(String),
    #[error("judge payload could not be decoded: {0}")]
    MalformedPayload(String),
}
