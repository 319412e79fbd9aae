//! Turn state machine and the report a finished turn produces.

use strum::Display;

use crate::types::Message;

/// Where a turn is in its cycle.
///
/// `AwaitingUser → ModelCall → (ToolCall → ToolResultRecorded | FinalAnswer)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TurnState {
    AwaitingUser,
    ModelCall,
    ToolCall,
    ToolResultRecorded,
    FinalAnswer,
}

impl TurnState {
    pub fn can_transition_to(self, next: TurnState) -> bool {
        matches!(
            (self, next),
            (Self::AwaitingUser, Self::ModelCall)
                | (Self::ModelCall, Self::ToolCall)
                | (Self::ModelCall, Self::FinalAnswer)
                | (Self::ToolCall, Self::ToolResultRecorded)
        )
    }

    /// A turn that reached this state has returned to the caller.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::ToolResultRecorded | Self::FinalAnswer)
    }
}

/// Outcome of a successful turn.
#[derive(Debug, Clone)]
pub struct TurnReport {
    /// Terminal state reached.
    pub state: TurnState,
    /// Full history after the turn.
    pub history: Vec<Message>,
    /// Name of the tool that ran, if any.
    pub executed_tool: Option<String>,
    /// Tool requests from the model that were not executed.
    pub ignored_tool_calls: usize,
}

impl TurnReport {
    /// The model's text answer when the turn ended without a tool call.
    pub fn answer(&self) -> Option<&str> {
        match self.state {
            TurnState::FinalAnswer => self.history.last().and_then(|m| m.content()),
            _ => None,
        }
    }
}
