//! Chat-completion client layer for marketq
//!
//! This crate provides the types and trait used to talk to a chat-completion
//! service. It includes:
//!
//! - Message types for a single system+user exchange
//! - Completion request/response types
//! - Provider trait for completion implementations
//! - An OpenAI-compatible provider over HTTP

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LlmError, Result};
pub use messages::{Message, Role};
pub use provider::LlmProvider;
pub use providers::{OpenAiConfig, OpenAiProvider};
