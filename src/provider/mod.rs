//! Model invoker trait and the OpenAI chat-completions implementation.

pub mod http;
pub mod openai;

pub use openai::OpenAiInvoker;

use async_trait::async_trait;

use crate::error::TurnkitError;
use crate::tools::ToolDefinition;
use crate::types::{AssistantMessage, Message};

/// One round-trip to a language model.
///
/// Receives the entire conversation and the tools on offer, returns exactly
/// one assistant message. Failures are provider-kind errors
/// (see [`TurnkitError::is_provider_error`]).
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &str;

    async fn invoke(
        &self,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<AssistantMessage, TurnkitError>;
}
