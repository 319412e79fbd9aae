//! The agent: drives one conversational turn at a time.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::AgentConfig;
use crate::error::TurnkitError;
use crate::provider::{ModelInvoker, OpenAiInvoker};
use crate::tools::builtin::default_registry;
use crate::tools::{stringify_result, ToolDefinition, ToolRegistry};
use crate::types::Message;

use super::conversation::ConversationStore;
use super::state::{TurnReport, TurnState};

/// An agent owning one conversation, a model invoker and a tool registry.
///
/// A turn calls the model once and runs at most one tool. The tool result is
/// recorded but not sent back to the model until the next turn.
pub struct Agent {
    invoker: Arc<dyn ModelInvoker>,
    registry: Arc<ToolRegistry>,
    conversation: ConversationStore,
}

impl Agent {
    /// Create an agent with an empty conversation.
    pub fn new(invoker: Arc<dyn ModelInvoker>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            invoker,
            registry,
            conversation: ConversationStore::new(),
        }
    }

    /// OpenAI invoker plus every built-in tool.
    pub fn from_config(config: &AgentConfig) -> Result<Self, TurnkitError> {
        let invoker = OpenAiInvoker::from_config(config)?;
        let registry = default_registry(config)?;
        Ok(Self::new(Arc::new(invoker), Arc::new(registry)))
    }

    /// Continue an existing conversation.
    pub fn with_conversation(mut self, conversation: ConversationStore) -> Self {
        self.conversation = conversation;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Get the conversation history.
    pub fn conversation(&self) -> &ConversationStore {
        &self.conversation
    }

    pub fn into_conversation(self) -> ConversationStore {
        self.conversation
    }

    /// Run one turn and return the full history.
    ///
    /// On error, whatever was appended before the failure stays recorded:
    /// the user message after a model failure, and additionally the
    /// assistant's tool request after a dispatch failure.
    pub async fn run_turn(
        &mut self,
        user_message: &str,
        tools: &[ToolDefinition],
    ) -> Result<Vec<Message>, TurnkitError> {
        self.run_turn_detailed(user_message, tools)
            .await
            .map(|report| report.history)
    }

    /// Like [`Agent::run_turn`], also reporting which state the turn ended in.
    pub async fn run_turn_detailed(
        &mut self,
        user_message: &str,
        tools: &[ToolDefinition],
    ) -> Result<TurnReport, TurnkitError> {
        let mut state = TurnState::AwaitingUser;

        self.conversation.append([Message::user(user_message)]);
        advance(&mut state, TurnState::ModelCall);

        let response = self.invoker.invoke(self.conversation.all(), tools).await?;
        let assistant = Message::from(response);
        let first_call = assistant.tool_calls().first().cloned();
        let ignored_tool_calls = assistant.tool_calls().len().saturating_sub(1);
        self.conversation.append([assistant]);

        let Some(invocation) = first_call else {
            advance(&mut state, TurnState::FinalAnswer);
            info!(history_len = self.conversation.len(), "turn finished with an answer");
            return Ok(self.report(state, None, 0));
        };

        advance(&mut state, TurnState::ToolCall);
        if ignored_tool_calls > 0 {
            debug!(ignored_tool_calls, "executing only the first tool call");
        }

        let result = self.registry.dispatch(&invocation, user_message).await?;
        self.conversation.append([Message::tool_result(
            invocation.id.as_str(),
            stringify_result(&result),
        )]);
        advance(&mut state, TurnState::ToolResultRecorded);

        info!(
            tool = invocation.name(),
            tool_call_id = %invocation.id,
            history_len = self.conversation.len(),
            "turn finished with a tool result"
        );

        Ok(self.report(
            state,
            Some(invocation.name().to_string()),
            ignored_tool_calls,
        ))
    }

    fn report(
        &self,
        state: TurnState,
        executed_tool: Option<String>,
        ignored_tool_calls: usize,
    ) -> TurnReport {
        TurnReport {
            state,
            history: self.conversation.snapshot(),
            executed_tool,
            ignored_tool_calls,
        }
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("provider", &self.invoker.provider_name())
            .field("registry", &self.registry)
            .field("history_len", &self.conversation.len())
            .finish()
    }
}

fn advance(state: &mut TurnState, next: TurnState) {
    debug_assert!(state.can_transition_to(next), "illegal turn transition {state} -> {next}");
    debug!(from = %state, to = %next, "turn state");
    *state = next;
}
