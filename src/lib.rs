//! # agentflow
//!
//! Multi-agent orchestration: named agents with instructions, tools, and
//! handoff edges, coordinated over a shared session that preserves
//! conversation history across turns and across handoffs.
//!
//! ## Core Concepts
//!
//! - **Agent**: a named persona with instructions, bound tools, and the
//!   handoff targets it may delegate to ([`Agent`], [`AgentGraph`])
//! - **Tool**: a named, schema-described callable an agent may invoke
//!   ([`Tool`], [`ToolRegistry`])
//! - **Session**: caller-owned conversation state for one dialogue
//!   ([`Session`])
//! - **Runner**: the turn state machine that dispatches agents, executes
//!   tool calls, and follows handoffs ([`Runner`])
//!
//! The model itself is an external capability ([`ModelCapability`]); an
//! OpenAI-backed implementation is provided ([`OpenAiModel`]), and
//! [`ScriptedModel`] gives deterministic replies for tests and demos.
//!
//! ## Getting Started
//!
//! ```rust
//! use agentflow::{Agent, AgentGraph, FunctionTool, RunConfig, Runner, ScriptedModel};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> agentflow::Result<()> {
//! let calculate = Arc::new(FunctionTool::simple(
//!     "calculate",
//!     "Evaluate a mathematical expression",
//!     |expr: String| if expr == "12*7" { "84".to_string() } else { "?".to_string() },
//! ));
//!
//! let assistant = Agent::simple("Assistant", "You are a helpful assistant.")
//!     .with_handoff("MathExpert", "Transfer for complex calculations")?;
//! let expert = Agent::simple("MathExpert", "You are a mathematics expert.")
//!     .with_tool(calculate)
//!     .with_handoff("Assistant", "Return to the main assistant")?;
//!
//! let graph = AgentGraph::new(vec![assistant, expert])?;
//! let mut session = Runner::start_session(&graph, "Assistant")?;
//!
//! // Scripted capability: hand off, use the tool, answer.
//! let model = ScriptedModel::new()
//!     .with_handoff("MathExpert")
//!     .with_tool_call("calculate", serde_json::json!({"input": "12*7"}))
//!     .with_final("84");
//!
//! let config = RunConfig::default().with_model(Arc::new(model));
//! let result = Runner::run_turn(&graph, &mut session, "What is 12 * 7?", &config).await?;
//!
//! assert_eq!(result.final_text.as_deref(), Some("84"));
//! assert_eq!(result.responding_agent, "MathExpert");
//! assert_eq!(result.tool_invocations.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod error;
pub mod items;
pub mod model;
pub mod openai;
pub mod result;
pub mod runner;
pub mod session;
pub mod tool;
pub mod tool_service;

pub use agent::{Agent, AgentConfig, AgentGraph, Handoff};
pub use error::{AgentError, Result};
pub use items::{Role, ToolCallRecord, TurnRecord};
pub use model::{ModelCapability, ModelReply, ScriptedModel};
pub use openai::OpenAiModel;
pub use result::TurnResult;
pub use runner::{RunConfig, Runner};
pub use session::Session;
pub use tool::{typed_tool, FunctionTool, Tool, ToolOutcome, ToolRegistry};
pub use tool_service::{ToolRequest, ToolResponse, ToolService};
