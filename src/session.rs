//! Caller-owned session state for one dialogue
//!
//! A [`Session`] holds the ordered conversation history and the name of the
//! agent currently in control. It is a plain value owned by whoever drives
//! the dialogue: the runner borrows it mutably for the duration of one turn,
//! so a single session can never see concurrent mutation. Independent
//! sessions are fully isolated from each other.
//!
//! History is append-only during a turn. [`Session::clear`] is the only way
//! to shrink it, and resets both the history and the active agent in one
//! step.

use uuid::Uuid;

use crate::agent::AgentGraph;
use crate::error::{AgentError, Result};
use crate::items::TurnRecord;

/// Conversation state for one dialogue: ordered history plus the active agent.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    starting_agent: String,
    active_agent: String,
    history: Vec<TurnRecord>,
}

impl Session {
    /// Create an empty session dispatching to `starting_agent`.
    ///
    /// Prefer [`crate::Runner::start_session`], which validates the starting
    /// agent against a graph first.
    pub fn new(starting_agent: impl Into<String>) -> Self {
        let starting_agent = starting_agent.into();
        Self {
            id: Uuid::new_v4().to_string(),
            starting_agent: starting_agent.clone(),
            active_agent: starting_agent,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The agent new sessions (and cleared sessions) dispatch to.
    pub fn starting_agent(&self) -> &str {
        &self.starting_agent
    }

    /// The agent the next turn will be dispatched to.
    pub fn active_agent(&self) -> &str {
        &self.active_agent
    }

    /// Read-only view of the conversation history, in insertion order.
    pub fn history(&self) -> &[TurnRecord] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Append a record. O(1); insertion order is preserved.
    pub fn append(&mut self, record: TurnRecord) {
        self.history.push(record);
    }

    /// Switch the active agent, validating the name against the graph.
    pub fn set_active_agent(&mut self, name: &str, graph: &AgentGraph) -> Result<()> {
        if !graph.contains(name) {
            return Err(AgentError::UnknownAgent {
                name: name.to_string(),
            });
        }
        self.active_agent = name.to_string();
        Ok(())
    }

    /// Reset the history to empty and the active agent back to the starting
    /// agent. Both happen in one step; no partial state is observable.
    pub fn clear(&mut self) {
        self.history.clear();
        self.active_agent = self.starting_agent.clone();
    }
}
