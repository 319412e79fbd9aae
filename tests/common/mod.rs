//! Shared test helpers and a scripted model invoker.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Barrier;

use turnkit::error::TurnkitError;
use turnkit::provider::ModelInvoker;
use turnkit::tools::{AgentTool, Tool, ToolDefinition, ToolParameters, ToolRegistry};
use turnkit::types::{AssistantMessage, Message, ToolInvocation};

/// What the invoker saw on one call.
#[derive(Debug, Clone)]
pub struct SeenCall {
    pub history: Vec<Message>,
    pub tool_names: Vec<String>,
}

/// A model invoker that replays queued responses in order.
#[derive(Default)]
pub struct ScriptedInvoker {
    responses: Mutex<Vec<Result<AssistantMessage, TurnkitError>>>,
    calls: Mutex<Vec<SeenCall>>,
}

impl ScriptedInvoker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a plain text answer.
    pub fn queue_text(&self, text: &str) {
        self.responses
            .lock()
            .unwrap()
            .push(Ok(AssistantMessage::text(text)));
    }

    /// Queue a response requesting the given `(id, name, arguments)` calls.
    pub fn queue_tool_calls(&self, calls: &[(&str, &str, &str)]) {
        let invocations = calls
            .iter()
            .map(|(id, name, args)| ToolInvocation::new(*id, *name, *args))
            .collect();
        self.responses
            .lock()
            .unwrap()
            .push(Ok(AssistantMessage::requesting_tools(invocations)));
    }

    /// Queue a failure.
    pub fn queue_error(&self, error: TurnkitError) {
        self.responses.lock().unwrap().push(Err(error));
    }

    pub fn calls(&self) -> Vec<SeenCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelInvoker for ScriptedInvoker {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn invoke(
        &self,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<AssistantMessage, TurnkitError> {
        self.calls.lock().unwrap().push(SeenCall {
            history: history.to_vec(),
            tool_names: tools.iter().map(|t| t.name.clone()).collect(),
        });
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(TurnkitError::provider("scripted", "no response queued"));
        }
        responses.remove(0)
    }
}

/// Answers `echo: <last user message>`; optionally waits at a barrier first.
pub struct EchoInvoker {
    barrier: Option<Barrier>,
}

impl EchoInvoker {
    /// Every call blocks until `parties` calls are in flight.
    pub fn gated(parties: usize) -> Arc<Self> {
        Arc::new(Self {
            barrier: Some(Barrier::new(parties)),
        })
    }
}

#[async_trait]
impl ModelInvoker for EchoInvoker {
    fn provider_name(&self) -> &str {
        "echo"
    }

    async fn invoke(
        &self,
        history: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<AssistantMessage, TurnkitError> {
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        let last = history.last().and_then(|m| m.content()).unwrap_or_default();
        Ok(AssistantMessage::text(format!("echo: {last}")))
    }
}

/// Tool that returns a fixed value and ignores its input.
pub fn constant_tool(name: &str, value: serde_json::Value) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        name,
        format!("Returns a fixed {name} result"),
        ToolParameters::empty(),
        move |_input| {
            let value = value.clone();
            async move { Ok(value) }
        },
    ))
}

/// Tool that echoes the user message it was given.
pub fn echo_user_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "echo_user",
        "Echo the triggering user message",
        ToolParameters::empty(),
        |input| async move { Ok(serde_json::Value::String(input.user_message)) },
    ))
}

/// Tool whose handler always fails.
pub fn failing_tool(name: &str) -> Arc<dyn Tool> {
    let tool_name = name.to_string();
    Arc::new(AgentTool::new(
        name,
        "Always fails",
        ToolParameters::empty(),
        move |_input| {
            let tool_name = tool_name.clone();
            async move { Err(TurnkitError::handler(tool_name, "upstream unavailable")) }
        },
    ))
}

pub fn registry(tools: Vec<Arc<dyn Tool>>) -> Arc<ToolRegistry> {
    Arc::new(ToolRegistry::from_tools(tools).unwrap())
}
