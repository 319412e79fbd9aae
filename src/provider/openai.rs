//! OpenAI Chat Completions API invoker.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::AgentConfig;
use crate::error::TurnkitError;
use crate::tools::ToolDefinition;
use crate::types::{AssistantMessage, Message, ToolInvocation};

use super::http::{bearer_headers, shared_client, status_to_error};
use super::ModelInvoker;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiInvoker {
    api_key: String,
    base_url: String,
    model: String,
    temperature: f64,
    system_prompt: String,
}

impl OpenAiInvoker {
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<String>,
        model: impl Into<String>,
        temperature: f64,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.into(),
            temperature,
            system_prompt: system_prompt.into(),
        }
    }

    /// Build from config; fails when no API key is configured.
    pub fn from_config(config: &AgentConfig) -> Result<Self, TurnkitError> {
        Ok(Self::new(
            config.require_api_key()?,
            config.openai_base_url.clone(),
            config.model.clone(),
            config.temperature,
            config.system_prompt.clone(),
        ))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn system_message(&self) -> serde_json::Value {
        let today = chrono::Utc::now().format("%Y-%m-%d");
        serde_json::json!({
            "role": "system",
            "content": format!("{}\n\n<context>\ntoday's date: {today}\n</context>", self.system_prompt),
        })
    }

    fn build_request_body(
        &self,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<serde_json::Value, TurnkitError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(self.system_message());
        for message in history {
            messages.push(serde_json::to_value(message)?);
        }

        let mut body = serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": messages,
        });

        if !tools.is_empty() {
            let tool_defs: Vec<serde_json::Value> = tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        }
                    })
                })
                .collect();
            if let Some(obj) = body.as_object_mut() {
                obj.insert("tools".into(), tool_defs.into());
                obj.insert("tool_choice".into(), "auto".into());
                obj.insert("parallel_tool_calls".into(), false.into());
            }
        }

        Ok(body)
    }
}

impl std::fmt::Debug for OpenAiInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiInvoker")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[async_trait]
impl ModelInvoker for OpenAiInvoker {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn invoke(
        &self,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<AssistantMessage, TurnkitError> {
        let body = self.build_request_body(history, tools)?;
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %self.model, history_len = history.len(), tools = tools.len(), "OpenAI invoke");

        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let data: ChatResponse = resp.json().await?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TurnkitError::provider("openai", "no choices in response"))?;

        Ok(AssistantMessage {
            content: choice.message.content,
            tool_calls: choice.message.tool_calls.unwrap_or_default(),
        })
    }
}

// Chat Completions response types (internal)

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ToolInvocation>>,
}
