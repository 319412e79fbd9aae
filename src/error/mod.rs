//! Error types for turnkit.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Boxed error carried as the cause of a [`TurnkitError::Handler`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Primary error type for every turnkit operation.
///
/// The orchestrator never retries; each variant surfaces to the caller as-is.
#[derive(Error, Debug)]
pub enum TurnkitError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Provider error: {provider}: {message}")]
    Provider { provider: String, message: String },

    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Malformed arguments for tool {tool_name}: {source}")]
    MalformedArguments {
        tool_name: String,
        #[source]
        source: serde_json::Error,
    },

    /// A tool handler failed. `source` keeps the handler's own error.
    #[error("Tool {tool_name} failed: {message}")]
    Handler {
        tool_name: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl TurnkitError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a provider error.
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a handler error for the named tool.
    pub fn handler(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Handler {
            tool_name: tool_name.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an error raised inside the named tool, keeping it as the source.
    pub fn handler_from(tool_name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        let source = source.into();
        Self::Handler {
            tool_name: tool_name.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Whether this error came from the model invoker (transport, auth, rate limit).
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            Self::Provider { .. }
                | Self::Api { .. }
                | Self::Authentication(_)
                | Self::RateLimited { .. }
                | Self::Network(_)
        )
    }

    /// Whether this error came from resolving or running a tool.
    pub fn is_tool_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownTool { .. } | Self::MalformedArguments { .. } | Self::Handler { .. }
        )
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::Provider { .. } => ErrorCategory::Api,
            Self::UnknownTool { .. } => ErrorCategory::UnknownTool,
            Self::MalformedArguments { .. } => ErrorCategory::MalformedArguments,
            Self::Handler { .. } => ErrorCategory::ToolExecution,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Whether a caller could reasonably retry the failed turn.
    ///
    /// Purely advisory: nothing inside the crate acts on it.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit
                | ErrorCategory::Network
                | ErrorCategory::Timeout
                | ErrorCategory::Server
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Authentication => RecoverySuggestion::CheckCredentials,
            ErrorCategory::RateLimit => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Network => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Timeout => RecoverySuggestion::IncreaseTimeout,
            ErrorCategory::Server => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::UnknownTool => RecoverySuggestion::RegisterTool,
            ErrorCategory::MalformedArguments => RecoverySuggestion::RephrasePrompt,
            ErrorCategory::ToolExecution => RecoverySuggestion::CheckToolImplementation,
            _ => RecoverySuggestion::ContactSupport,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TurnkitError>;
