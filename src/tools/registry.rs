//! Name-keyed tool registry and the dispatcher that runs invocations against it.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::arguments::ToolArguments;
use super::tool::{Tool, ToolInput};
use super::types::ToolDefinition;
use crate::error::TurnkitError;
use crate::types::ToolInvocation;

/// Tools available to an agent, keyed by exact name.
///
/// Built once at startup and only read afterwards.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of tools, rejecting duplicate names.
    pub fn from_tools(tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Result<Self, TurnkitError> {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    /// Register a tool under its name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), TurnkitError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(TurnkitError::Configuration(format!(
                "tool '{name}' is already registered"
            )));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Look up a tool by exact, case-sensitive name.
    pub fn resolve(&self, name: &str) -> Result<&Arc<dyn Tool>, TurnkitError> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| TurnkitError::UnknownTool {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions for every registered tool.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Definitions for a named subset, in the order asked for.
    pub fn definitions_for<I, S>(&self, names: I) -> Result<Vec<ToolDefinition>, TurnkitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| self.resolve(name.as_ref()).map(|t| t.definition()))
            .collect()
    }

    /// Run one invocation and hand back the tool's result untouched.
    ///
    /// Arguments are parsed before the name is resolved, so malformed
    /// arguments win over an unknown name. Handler failures of any kind come
    /// back as [`TurnkitError::Handler`], with the tool's own error as the
    /// source.
    pub async fn dispatch(
        &self,
        invocation: &ToolInvocation,
        user_message: &str,
    ) -> Result<serde_json::Value, TurnkitError> {
        let tool_args = ToolArguments::parse(invocation.arguments()).map_err(|source| {
            TurnkitError::MalformedArguments {
                tool_name: invocation.name().to_string(),
                source,
            }
        })?;
        let tool = self.resolve(invocation.name())?;

        debug!(tool = invocation.name(), tool_call_id = %invocation.id, "dispatching tool");

        let input = ToolInput::new(user_message, tool_args);
        tool.execute(&input).await.map_err(|err| match err {
            TurnkitError::Handler { .. } => err,
            other => TurnkitError::handler_from(invocation.name(), other),
        })
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

/// Render a tool result as tool-message content.
///
/// Strings pass through verbatim; anything else becomes compact JSON.
pub fn stringify_result(result: &serde_json::Value) -> String {
    match result {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
