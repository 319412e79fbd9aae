//! Agent system: conversation state and the one-shot tool-calling turn.

pub mod agent;
pub mod conversation;
pub mod session;
pub mod state;

pub use agent::Agent;
pub use conversation::{ConversationStore, MessageRecord};
pub use session::{AgentSessions, SharedAgent};
pub use state::{TurnReport, TurnState};
