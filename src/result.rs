//! Result of one completed turn

use crate::error::AgentError;
use crate::items::ToolCallRecord;

/// What a turn produced: a final answer, or an abort with a partial trace.
///
/// Immutable once returned. `tool_invocations` lists every tool call made
/// during the turn in execution order, including calls whose outcome was an
/// error, and is populated on aborts as well.
#[derive(Debug)]
pub struct TurnResult {
    /// The final text answer; `None` when the turn aborted.
    pub final_text: Option<String>,
    /// The agent in control when the turn ended.
    pub responding_agent: String,
    /// Tool calls made during the turn, in order.
    pub tool_invocations: Vec<ToolCallRecord>,
    /// Why the turn aborted, if it did.
    pub error: Option<AgentError>,
}

impl TurnResult {
    pub(crate) fn success(
        final_text: impl Into<String>,
        responding_agent: impl Into<String>,
        tool_invocations: Vec<ToolCallRecord>,
    ) -> Self {
        Self {
            final_text: Some(final_text.into()),
            responding_agent: responding_agent.into(),
            tool_invocations,
            error: None,
        }
    }

    pub(crate) fn aborted(
        responding_agent: impl Into<String>,
        tool_invocations: Vec<ToolCallRecord>,
        error: AgentError,
    ) -> Self {
        Self {
            final_text: None,
            responding_agent: responding_agent.into(),
            tool_invocations,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&AgentError> {
        self.error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_result() {
        let result = TurnResult::success("84", "MathExpert", vec![]);
        assert!(result.is_success());
        assert_eq!(result.final_text.as_deref(), Some("84"));
        assert_eq!(result.responding_agent, "MathExpert");
        assert!(result.error().is_none());
    }

    #[test]
    fn test_aborted_result_keeps_partial_trace() {
        let call = ToolCallRecord::pending("calculate", serde_json::json!({}))
            .with_result(serde_json::json!("84"));
        let result = TurnResult::aborted(
            "Assistant",
            vec![call],
            AgentError::ToolLoopExceeded { limit: 8 },
        );

        assert!(!result.is_success());
        assert!(result.final_text.is_none());
        assert_eq!(result.tool_invocations.len(), 1);
        assert!(matches!(
            result.error(),
            Some(AgentError::ToolLoopExceeded { limit: 8 })
        ));
    }
}
