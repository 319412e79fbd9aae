//! Agent session management.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;

use crate::provider::ModelInvoker;
use crate::tools::ToolRegistry;

use super::agent::Agent;

/// A session's agent, locked for the duration of a turn.
pub type SharedAgent = Arc<Mutex<Agent>>;

/// One agent per named session, all sharing an invoker and a registry.
///
/// Each session owns its own conversation behind its own lock, so turns in
/// different sessions run concurrently while turns in one session are
/// serialized. All methods take `&self`; share the manager via `Arc`.
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use turnkit::agent::AgentSessions;
/// # async fn example(sessions: Arc<AgentSessions>) -> turnkit::error::Result<()> {
/// let alice = sessions.get_or_create("alice");
/// let history = alice.lock().await.run_turn("hello", &[]).await?;
/// # Ok(())
/// # }
/// ```
pub struct AgentSessions {
    invoker: Arc<dyn ModelInvoker>,
    registry: Arc<ToolRegistry>,
    sessions: RwLock<HashMap<String, SharedAgent>>,
}

impl AgentSessions {
    pub fn new(invoker: Arc<dyn ModelInvoker>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            invoker,
            registry,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Get or create a session by ID.
    pub fn get_or_create(&self, session_id: &str) -> SharedAgent {
        if let Some(agent) = self.get(session_id) {
            return agent;
        }
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(session_id.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(Agent::new(
                    self.invoker.clone(),
                    self.registry.clone(),
                )))
            })
            .clone()
    }

    /// Get an existing session.
    pub fn get(&self, session_id: &str) -> Option<SharedAgent> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned()
    }

    /// Remove a session. A turn already holding the agent finishes normally.
    pub fn remove(&self, session_id: &str) -> Option<SharedAgent> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id)
    }

    /// List session IDs, sorted.
    pub fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for AgentSessions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSessions")
            .field("provider", &self.invoker.provider_name())
            .field("sessions", &self.session_ids())
            .finish()
    }
}
