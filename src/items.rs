//! Turn records and tool-call records
//!
//! This module defines the data that flows through a conversation: who said
//! what, and which tools were invoked along the way. Records are append-only
//! once inside a session; display concerns live entirely outside the core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Role of a turn record in the conversation.
///
/// The set is closed; consumers match exhaustively rather than inspecting
/// content shapes at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A single tool invocation: the request the model made and what came back.
///
/// Exactly one of `result` and `error` is populated once the invocation has
/// completed. An error here is a recovered [`crate::AgentError::ToolExecution`]
/// (or an unknown-tool lookup failure); it never aborts the turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Unique id for this call, echoed back to the model with the result
    pub id: String,
    /// Name of the invoked tool
    pub tool_name: String,
    /// Arguments the model supplied
    pub arguments: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolCallRecord {
    /// Record for a call that has been requested but not yet executed.
    pub fn pending(tool_name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tool_name: tool_name.into(),
            arguments,
            result: None,
            error: None,
        }
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self.error = None;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self.result = None;
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// One entry in a session's conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub role: Role,
    pub content: String,
    /// The agent this record is attributed to, where that is meaningful
    /// (assistant output, tool executions on an agent's behalf).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    /// Present on `Tool` records: the invocation this record captures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCallRecord>,
    pub created_at: DateTime<Utc>,
}

impl TurnRecord {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            agent_name: None,
            tool_call: None,
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            agent_name: None,
            tool_call: None,
            created_at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>, agent_name: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            agent_name: Some(agent_name.into()),
            tool_call: None,
            created_at: Utc::now(),
        }
    }

    pub fn tool(
        content: impl Into<String>,
        agent_name: impl Into<String>,
        tool_call: ToolCallRecord,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            agent_name: Some(agent_name.into()),
            tool_call: Some(tool_call),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_record_constructors() {
        let sys = TurnRecord::system("transfer note");
        assert_eq!(sys.role, Role::System);
        assert!(sys.agent_name.is_none());
        assert!(sys.tool_call.is_none());

        let user = TurnRecord::user("Hello");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.content, "Hello");

        let assistant = TurnRecord::assistant("Hi there", "Assistant");
        assert_eq!(assistant.role, Role::Assistant);
        assert_eq!(assistant.agent_name.as_deref(), Some("Assistant"));
    }

    #[test]
    fn test_tool_call_record_lifecycle() {
        let pending = ToolCallRecord::pending("calculate", serde_json::json!({"expression": "2+2"}));
        assert!(pending.result.is_none());
        assert!(pending.error.is_none());
        assert!(!pending.is_error());

        let done = pending.clone().with_result(serde_json::json!("4"));
        assert_eq!(done.result, Some(serde_json::json!("4")));
        assert!(!done.is_error());

        let failed = pending.with_error("division by zero");
        assert!(failed.is_error());
        assert!(failed.result.is_none());
    }

    #[test]
    fn test_tool_record_carries_invocation() {
        let call = ToolCallRecord::pending("get_time", serde_json::json!({}))
            .with_result(serde_json::json!("2025-01-01 00:00:00"));
        let record = TurnRecord::tool("2025-01-01 00:00:00", "Assistant", call);

        assert_eq!(record.role, Role::Tool);
        let call = record.tool_call.unwrap();
        assert_eq!(call.tool_name, "get_time");
        assert!(!call.is_error());
    }

    #[test]
    fn test_role_serialization() {
        let serialized = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(serialized, "\"assistant\"");

        let deserialized: Role = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(deserialized, Role::System);
    }

    #[test]
    fn test_record_round_trip() {
        let record = TurnRecord::tool(
            "84",
            "MathExpert",
            ToolCallRecord::pending("calculate", serde_json::json!({"expression": "12*7"}))
                .with_result(serde_json::json!("84")),
        );

        let serialized = serde_json::to_string(&record).unwrap();
        let back: TurnRecord = serde_json::from_str(&serialized).unwrap();
        assert_eq!(back.role, Role::Tool);
        assert_eq!(back.tool_call.unwrap().tool_name, "calculate");
    }
}
