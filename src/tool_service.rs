//! Tower service adapter over the tool registry
//!
//! The runner does not call tool handlers directly; it drives a
//! [`ToolService`] via `oneshot`, one request per tool-call reply. The
//! service resolves the name against the registry and folds both
//! unknown-tool lookups and handler failures into the response outcome, so
//! the orchestration loop sees every tool problem as recoverable content.

use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;
use tracing::debug;

use crate::error::{AgentError, Result};
use crate::tool::{ToolOutcome, ToolRegistry};

/// One tool invocation request, addressed by name.
#[derive(Debug, Clone)]
pub struct ToolRequest {
    /// Id of the turn this call belongs to
    pub turn_id: String,
    /// Agent on whose behalf the call runs
    pub agent: String,
    /// Call id echoed back to the model with the result
    pub call_id: String,
    pub tool_name: String,
    pub arguments: Value,
}

/// Outcome of one tool invocation.
#[derive(Debug, Clone)]
pub struct ToolResponse {
    pub call_id: String,
    pub tool_name: String,
    pub outcome: ToolOutcome,
}

/// `tower::Service` dispatching [`ToolRequest`]s against a registry.
#[derive(Debug, Clone)]
pub struct ToolService {
    registry: Arc<ToolRegistry>,
}

impl ToolService {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }
}

impl Service<ToolRequest> for ToolService {
    type Response = ToolResponse;
    type Error = AgentError;
    type Future = BoxFuture<'static, Result<ToolResponse>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ToolRequest) -> Self::Future {
        let registry = self.registry.clone();
        Box::pin(async move {
            debug!(
                turn_id = %req.turn_id,
                agent = %req.agent,
                tool = %req.tool_name,
                "Executing tool call"
            );

            let outcome = match registry.invoke(&req.tool_name, req.arguments.clone()).await {
                Ok(outcome) => outcome,
                // An unregistered name is recoverable context, not an abort
                Err(err @ AgentError::UnknownTool { .. }) => ToolOutcome::err(err.to_string()),
                Err(err) => return Err(err),
            };

            Ok(ToolResponse {
                call_id: req.call_id,
                tool_name: req.tool_name,
                outcome,
            })
        })
    }
}
