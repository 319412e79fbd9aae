//! Append-only conversation history.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::types::{Message, Role, ToolInvocation};

/// Bookkeeping stamped on each message when it is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordMeta {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A stored message together with its metadata.
///
/// Serializes as `{ "id", "created_at", "message" }` for export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MessageRecord<'a> {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub message: &'a Message,
}

/// Ordered message log for one session.
///
/// Messages are only ever appended; nothing is edited or removed.
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    meta: Vec<RecordMeta>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append messages in the order given.
    pub fn append(&mut self, messages: impl IntoIterator<Item = Message>) {
        for message in messages {
            self.meta.push(RecordMeta {
                id: Uuid::new_v4(),
                created_at: Utc::now(),
            });
            self.messages.push(message);
        }
    }

    /// Full history in insertion order.
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    /// Owned copy of the full history.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Messages with their ids and creation times.
    pub fn records(&self) -> impl Iterator<Item = MessageRecord<'_>> {
        self.messages
            .iter()
            .zip(&self.meta)
            .map(|(message, meta)| MessageRecord {
                id: meta.id,
                created_at: meta.created_at,
                message,
            })
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Find the assistant tool invocation with the given id.
    pub fn find_tool_call(&self, tool_call_id: &str) -> Option<&ToolInvocation> {
        self.messages
            .iter()
            .flat_map(|m| m.tool_calls())
            .find(|call| call.id == tool_call_id)
    }

    /// The invocation a failed turn left without a tool result.
    ///
    /// Some only when the history ends on an assistant message that requested
    /// tools; the first request is the one a turn would have executed.
    pub fn pending_tool_call(&self) -> Option<&ToolInvocation> {
        self.messages
            .last()
            .filter(|m| m.role() == Role::Assistant)
            .and_then(|m| m.tool_calls().first())
    }
}
