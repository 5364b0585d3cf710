//! Error types for query interpretation

use thiserror::Error;

/// Result type alias for interpretation operations
pub type Result<T> = std::result::Result<T, InterpretError>;

/// Errors that can occur while interpreting a query
#[derive(Debug, Error)]
pub enum InterpretError {
    /// The query was empty or whitespace-only
    #[error("query must not be empty")]
    EmptyQuery,

    /// The completion service call failed
    #[error("completion service error: {0}")]
    Completion(#[from] marketq_llm::LlmError),

    /// The completion reply was not parseable as an action plan
    #[error("malformed interpretation reply: {0}")]
    MalformedReply(String),

    /// The parsed plan violated a structural invariant
    #[error("invalid action plan: {0}")]
    InvalidPlan(String),
}
