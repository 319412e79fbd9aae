//! Error classification and recovery hints.

/// Broad error category for routing caller-side recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Serialization,
    UnknownTool,
    MalformedArguments,
    ToolExecution,
    Unknown,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    RetryWithBackoff,
    CheckCredentials,
    CheckConfiguration,
    IncreaseTimeout,
    RegisterTool,
    RephrasePrompt,
    CheckToolImplementation,
    ContactSupport,
}
