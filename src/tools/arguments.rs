//! Typed access to tool call arguments.

use crate::error::TurnkitError;

/// Parsed tool call arguments, opaque to the dispatcher.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Parse the serialized arguments a model produced.
    ///
    /// A blank string stands for "no arguments" and parses as `{}`.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::new(serde_json::json!({})));
        }
        serde_json::from_str(trimmed).map(Self::new)
    }

    /// Get the raw JSON value.
    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, TurnkitError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| TurnkitError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// Get an integer argument.
    pub fn get_i64(&self, key: &str) -> Result<i64, TurnkitError> {
        self.value
            .get(key)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| TurnkitError::InvalidArgument(format!("Missing integer argument: {key}")))
    }

    /// Deserialize the entire arguments into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, TurnkitError> {
        serde_json::from_value(self.value.clone()).map_err(|e| {
            TurnkitError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }
}
