//! Tool trait and closure-based tool wrapper.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use super::arguments::ToolArguments;
use super::types::{ToolDefinition, ToolParameters};
use super::validation::validate_arguments;
use crate::error::TurnkitError;

/// Everything a tool receives when it runs.
#[derive(Debug, Clone)]
pub struct ToolInput {
    /// The user message of the turn that led to this call.
    pub user_message: String,
    /// Arguments parsed from the model's invocation.
    pub tool_args: ToolArguments,
}

impl ToolInput {
    pub fn new(user_message: impl Into<String>, tool_args: ToolArguments) -> Self {
        Self {
            user_message: user_message.into(),
            tool_args,
        }
    }
}

/// Core tool trait. Implement it to create custom tools.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match what the model calls).
    fn name(&self) -> &str;

    /// Tells the model when to call this tool, so treat it as contract text.
    fn description(&self) -> &str;

    /// JSON Schema parameters.
    fn parameters(&self) -> &ToolParameters;

    /// Schema advertised to the model.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters().schema.clone(),
        }
    }

    /// Execute the tool. Implementations validate their own argument shape.
    async fn execute(&self, input: &ToolInput) -> Result<serde_json::Value, TurnkitError>;
}

type ToolHandler = dyn Fn(ToolInput) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, TurnkitError>> + Send>>
    + Send
    + Sync;

/// Closure-based tool for quick tool creation.
///
/// Arguments are checked against the declared schema before the closure runs.
pub struct AgentTool {
    name: String,
    description: String,
    parameters: ToolParameters,
    handler: Arc<ToolHandler>,
}

impl AgentTool {
    /// Create a tool from a closure.
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: ToolParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolInput) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, TurnkitError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: Arc::new(move |input| Box::pin(handler(input))),
        }
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(&self, input: &ToolInput) -> Result<serde_json::Value, TurnkitError> {
        validate_arguments(input.tool_args.raw(), &self.parameters.schema).map_err(|message| {
            TurnkitError::InvalidArgument(format!("{}: {message}", self.name))
        })?;
        (self.handler)(input.clone()).await
    }
}

impl std::fmt::Debug for AgentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_tool() -> AgentTool {
        AgentTool::new(
            "echo",
            "Echo the text back",
            ToolParameters::object()
                .string("text", "Text to echo", true)
                .build(),
            |input| async move {
                let text = input.tool_args.get_str("text")?;
                Ok(serde_json::json!(format!("{text} ({})", input.user_message)))
            },
        )
    }

    #[tokio::test]
    async fn closure_receives_user_message_and_args() {
        let tool = echo_tool();
        let input = ToolInput::new(
            "say it",
            ToolArguments::new(serde_json::json!({ "text": "hello" })),
        );
        let result = tool.execute(&input).await.expect("echo should succeed");
        assert_eq!(result, serde_json::json!("hello (say it)"));
    }

    #[tokio::test]
    async fn schema_mismatch_is_rejected_before_the_closure_runs() {
        let tool = echo_tool();
        let input = ToolInput::new("x", ToolArguments::new(serde_json::json!({ "text": 5 })));
        let err = tool.execute(&input).await.unwrap_err();
        assert!(matches!(err, TurnkitError::InvalidArgument(ref m) if m.starts_with("echo:")));
    }

    #[test]
    fn definition_mirrors_declared_schema() {
        let definition = echo_tool().definition();
        assert_eq!(definition.name, "echo");
        assert_eq!(definition.description, "Echo the text back");
        assert_eq!(definition.parameters["required"][0], "text");
    }
}
