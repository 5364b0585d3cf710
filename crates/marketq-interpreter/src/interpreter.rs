//! Query interpreter driving the completion service

use crate::error::{InterpretError, Result};
use crate::json::extract_json;
use crate::plan::ActionPlan;
use crate::prompt;
use marketq_llm::{CompletionRequest, LlmProvider, Message};
use std::sync::Arc;
use tracing::{debug, instrument};

const DEFAULT_MAX_TOKENS: usize = 2048;

/// Translates free-text stock queries into validated action plans
///
/// The provider is injected so tests (and alternative deployments) can
/// substitute the completion service. Each call is independent: one
/// system+user exchange, no history, no caching of identical queries.
pub struct QueryInterpreter {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: usize,
}

impl QueryInterpreter {
    /// Create an interpreter for the given provider and model
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Override the reply token budget
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Interpret a user query into an action plan
    ///
    /// Fails with [`InterpretError::EmptyQuery`] before any network call when
    /// the query is blank. A reply that cannot be parsed or that violates the
    /// plan invariants fails the call; the completion service is never
    /// re-invoked automatically.
    #[instrument(skip(self, query), fields(model = %self.model))]
    pub async fn interpret(&self, query: &str) -> Result<ActionPlan> {
        if query.trim().is_empty() {
            return Err(InterpretError::EmptyQuery);
        }

        let request = CompletionRequest::builder(&self.model)
            .system(prompt::system_prompt())
            .add_message(Message::user(query))
            .max_tokens(self.max_tokens)
            .json_response(true)
            .build();

        let response = self.provider.complete(request).await?;
        debug!(reply_len = response.content.len(), "received interpretation reply");

        let json_str = extract_json(&response.content)
            .unwrap_or_else(|| response.content.trim().to_string());

        let mut plan: ActionPlan = serde_json::from_str(&json_str).map_err(|e| {
            InterpretError::MalformedReply(format!("reply is not a valid action plan: {e}"))
        })?;

        plan.normalize().map_err(InterpretError::InvalidPlan)?;

        Ok(plan)
    }
}
