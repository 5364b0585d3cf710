//! Query interpretation for marketq
//!
//! This crate turns a free-text stock-market question into a structured
//! [`ActionPlan`] by sending the question, together with a fixed system
//! instruction, to a chat-completion service and validating the reply. The
//! plan tells callers which data fetches to issue; nothing here touches
//! market data itself.
//!
//! The system prompt is the contract: the enumerated action types and the
//! metric-name catalog it lists are what downstream consumers rely on, so
//! changes to it are versioned (see [`prompt::PROMPT_VERSION`]).

pub mod error;
pub mod interpreter;
pub mod json;
pub mod plan;
pub mod prompt;

// Re-export main types
pub use error::{InterpretError, Result};
pub use interpreter::QueryInterpreter;
pub use json::extract_json;
pub use plan::{Action, ActionPlan, ActionType, KeyDate, FALLBACK_METRICS};
