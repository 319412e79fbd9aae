//! Convenience re-exports for common use.

pub use crate::agent::{Agent, AgentSessions, ConversationStore, TurnReport, TurnState};
pub use crate::config::AgentConfig;
pub use crate::error::{Result, TurnkitError};
pub use crate::provider::{ModelInvoker, OpenAiInvoker};
pub use crate::tools::{AgentTool, Tool, ToolArguments, ToolDefinition, ToolInput, ToolParameters, ToolRegistry};
pub use crate::types::{AssistantMessage, Message, Role, ToolInvocation};
