//! Model capability consumed by the orchestrator
//!
//! The core never talks to a provider directly; it consumes a
//! [`ModelCapability`] that takes the active agent's context plus the
//! conversation history and yields exactly one of three replies: a final
//! text answer, a tool-call request, or a handoff request. The reply is a
//! closed enum handled by exhaustive matching in the runner.
//!
//! [`ScriptedModel`] is a queue-backed capability for tests and demos.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use uuid::Uuid;

use crate::agent::Agent;
use crate::error::{AgentError, Result};
use crate::items::TurnRecord;

/// One reply from the model capability.
#[derive(Debug, Clone)]
pub enum ModelReply {
    /// A final text answer; completes the turn.
    Final { text: String },
    /// A request to invoke a named tool with the given arguments.
    ToolCall {
        id: String,
        name: String,
        arguments: Value,
    },
    /// A request to transfer control to another agent.
    Handoff {
        target: String,
        reason: Option<String>,
    },
}

impl ModelReply {
    pub fn final_text(text: impl Into<String>) -> Self {
        Self::Final { text: text.into() }
    }

    pub fn tool_call(name: impl Into<String>, arguments: Value) -> Self {
        Self::ToolCall {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            arguments,
        }
    }

    pub fn handoff(target: impl Into<String>) -> Self {
        Self::Handoff {
            target: target.into(),
            reason: None,
        }
    }
}

/// The external "send message, receive response" capability.
///
/// Implementations must be safe to share across sessions; the orchestrator
/// guarantees at most one in-flight call per session.
#[async_trait]
pub trait ModelCapability: Send + Sync {
    /// Produce the next reply given the active agent's context and the full
    /// conversation history. Failures are fatal to the current turn.
    async fn send(&self, agent: &Agent, history: &[TurnRecord]) -> Result<ModelReply>;
}

/// Deterministic capability that replays a queue of replies.
///
/// Useful for tests and offline demos. An exhausted script is a capability
/// failure, so tests must enqueue every reply they expect to consume.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<ModelReply>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, reply: ModelReply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn with_final(self, text: impl Into<String>) -> Self {
        self.with_reply(ModelReply::final_text(text))
    }

    pub fn with_tool_call(self, name: impl Into<String>, arguments: Value) -> Self {
        self.with_reply(ModelReply::tool_call(name, arguments))
    }

    pub fn with_handoff(self, target: impl Into<String>) -> Self {
        self.with_reply(ModelReply::handoff(target))
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelCapability for ScriptedModel {
    async fn send(&self, _agent: &Agent, _history: &[TurnRecord]) -> Result<ModelReply> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AgentError::ModelCapability {
                message: "scripted model exhausted".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_scripted_model_replays_in_order() {
        let model = ScriptedModel::new()
            .with_tool_call("calculate", serde_json::json!({"expression": "2+2"}))
            .with_final("4");
        let agent = Agent::simple("T", "test");

        let first = model.send(&agent, &[]).await.unwrap();
        assert!(matches!(first, ModelReply::ToolCall { ref name, .. } if name == "calculate"));

        let second = model.send(&agent, &[]).await.unwrap();
        match second {
            ModelReply::Final { text } => assert_eq!(text, "4"),
            other => panic!("expected final reply, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_scripted_model_exhaustion_is_capability_error() {
        let model = ScriptedModel::new();
        let agent = Agent::simple("T", "test");

        let err = model.send(&agent, &[]).await.unwrap_err();
        assert!(matches!(err, AgentError::ModelCapability { .. }));
    }

    #[test]
    fn test_tool_call_reply_gets_unique_ids() {
        let a = ModelReply::tool_call("t", serde_json::json!({}));
        let b = ModelReply::tool_call("t", serde_json::json!({}));
        match (a, b) {
            (ModelReply::ToolCall { id: ia, .. }, ModelReply::ToolCall { id: ib, .. }) => {
                assert_ne!(ia, ib);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_remaining_counts_queue() {
        let model = ScriptedModel::new().with_final("a").with_final("b");
        assert_eq!(model.remaining(), 2);
    }
}
