//! Runner: the turn state machine
//!
//! The runner drives one turn of a dialogue: it dispatches the active agent
//! against the model capability, executes requested tool calls through the
//! tool service, follows handoff directives across the agent graph, and
//! returns a [`TurnResult`] once a final answer is produced or the turn
//! aborts.
//!
//! Per turn the machine moves through
//! `DISPATCH → TOOL_EXECUTION* → HANDOFF? → DISPATCH → COMPLETE`. Tool
//! failures are recovered locally and fed back to the model as context; loop
//! bounds, invalid handoffs, and capability failures abort the turn. An
//! aborted turn leaves every already-appended record in place (executed tool
//! calls are real side effects and stay recorded), and the session remains
//! usable for the next turn.

use std::sync::Arc;
use tower::ServiceExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::agent::{Agent, AgentGraph};
use crate::error::{AgentError, Result};
use crate::items::{Role, ToolCallRecord, TurnRecord};
use crate::model::{ModelCapability, ModelReply};
use crate::openai::OpenAiModel;
use crate::result::TurnResult;
use crate::session::Session;
use crate::tool_service::{ToolRequest, ToolService};

fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() > max {
        let mut out = s.chars().take(max).collect::<String>();
        out.push('…');
        out
    } else {
        s.to_string()
    }
}

fn format_history_for_log(history: &[TurnRecord]) -> String {
    let mut lines = Vec::new();
    for (idx, record) in history.iter().enumerate() {
        let line = match record.role {
            Role::User => format!("{:02} USER     | {}", idx, truncate_for_log(&record.content, 160)),
            Role::System => format!(
                "{:02} SYSTEM   | {}",
                idx,
                truncate_for_log(&record.content, 160)
            ),
            Role::Assistant => format!(
                "{:02} ASSIST   | agent={} {}",
                idx,
                record.agent_name.as_deref().unwrap_or("<unattributed>"),
                truncate_for_log(&record.content, 120)
            ),
            Role::Tool => {
                let (name, failed) = record
                    .tool_call
                    .as_ref()
                    .map(|c| (c.tool_name.as_str(), c.is_error()))
                    .unwrap_or(("<missing tool_call>", false));
                format!(
                    "{:02} TOOL     | tool={} error={} payload={}",
                    idx,
                    name,
                    failed,
                    truncate_for_log(&record.content, 120)
                )
            }
        };
        lines.push(line);
    }
    lines.join("\n")
}

/// Configuration for a turn.
///
/// The loop bounds guard against a model that keeps requesting tools forever
/// and against agents ping-ponging control between each other.
#[derive(Clone)]
pub struct RunConfig {
    /// Maximum consecutive tool-call iterations per dispatch run of a single
    /// agent. The bound permits this many executions; the next tool-call
    /// reply aborts the turn with [`AgentError::ToolLoopExceeded`].
    pub max_tool_calls: usize,

    /// Maximum handoffs per turn; exceeding aborts with
    /// [`AgentError::HandoffLoopExceeded`].
    pub max_handoffs: usize,

    /// The model capability to dispatch against. When `None`, an
    /// [`OpenAiModel`] is constructed from the environment.
    pub model: Option<Arc<dyn ModelCapability>>,
}

impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("max_tool_calls", &self.max_tool_calls)
            .field("max_handoffs", &self.max_handoffs)
            .field("model", &self.model.is_some())
            .finish()
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_tool_calls: 8,
            max_handoffs: 5,
            model: None,
        }
    }
}

impl RunConfig {
    pub fn with_model(mut self, model: Arc<dyn ModelCapability>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_max_tool_calls(mut self, limit: usize) -> Self {
        self.max_tool_calls = limit.max(1);
        self
    }

    pub fn with_max_handoffs(mut self, limit: usize) -> Self {
        self.max_handoffs = limit.max(1);
        self
    }
}

/// Stateless orchestrator over an [`AgentGraph`] and caller-owned sessions.
///
/// ## Example
///
/// ```rust
/// use agentflow::{Agent, AgentGraph, ModelReply, RunConfig, Runner, ScriptedModel};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> agentflow::Result<()> {
/// let graph = AgentGraph::new(vec![Agent::simple("Echo", "Echo the user")])?;
/// let mut session = Runner::start_session(&graph, "Echo")?;
///
/// let config = RunConfig::default()
///     .with_model(Arc::new(ScriptedModel::new().with_final("Hello, world!")));
/// let result = Runner::run_turn(&graph, &mut session, "Hi", &config).await?;
/// assert_eq!(result.final_text.as_deref(), Some("Hello, world!"));
/// # Ok(())
/// # }
/// ```
pub struct Runner;

impl Runner {
    /// Create a session dispatching to `starting_agent`.
    ///
    /// Fails with [`AgentError::UnknownAgent`] when the agent is not in the
    /// graph. The session can only ever reach agents in the handoff closure
    /// of its starting agent, so the reachable set is logged here once.
    pub fn start_session(graph: &AgentGraph, starting_agent: &str) -> Result<Session> {
        let reachable = graph.reachable_from(starting_agent)?;
        let session = Session::new(starting_agent);
        info!(
            session_id = %session.id(),
            agent = %starting_agent,
            reachable_agents = reachable.len(),
            "Session started"
        );
        Ok(session)
    }

    /// Reset a session: empty history, active agent back to the start.
    pub fn clear_session(session: &mut Session) {
        session.clear();
        info!(session_id = %session.id(), "Session cleared");
    }

    /// Drive one turn: new user input through to a final answer or an abort.
    ///
    /// Turn-level failures (loop bounds, invalid handoffs, capability
    /// errors) come back as `Ok` with [`TurnResult::error`] populated; `Err`
    /// is reserved for setup misuse such as a session whose active agent is
    /// not in the supplied graph.
    pub async fn run_turn(
        graph: &AgentGraph,
        session: &mut Session,
        input: impl Into<String>,
        config: &RunConfig,
    ) -> Result<TurnResult> {
        let input = input.into();
        let turn_id = Uuid::new_v4().to_string();

        let mut agent: Arc<Agent> = graph
            .get(session.active_agent())
            .cloned()
            .ok_or_else(|| AgentError::UnknownAgent {
                name: session.active_agent().to_string(),
            })?;

        let model: Arc<dyn ModelCapability> = match &config.model {
            Some(model) => model.clone(),
            None => Arc::new(OpenAiModel::from_env()?),
        };

        info!(turn_id = %turn_id, agent = %agent.name(), "Starting turn");
        session.append(TurnRecord::user(input));

        let mut tool_invocations: Vec<ToolCallRecord> = Vec::new();
        let mut service = ToolService::new(Arc::new(agent.tool_registry()?));
        // Consecutive tool calls in the current agent's dispatch run
        let mut tool_calls_made = 0usize;
        let mut handoffs_made = 0usize;

        loop {
            debug!(
                target: "runner::history",
                "\n=== Dispatching {} (model: {}) ===\n{}\n=== end ===",
                agent.name(),
                agent.config.model,
                format_history_for_log(session.history())
            );

            let reply = match model.send(&agent, session.history()).await {
                Ok(reply) => reply,
                Err(err) => {
                    warn!(turn_id = %turn_id, agent = %agent.name(), error = %err, "Model capability failed");
                    return Ok(TurnResult::aborted(agent.name(), tool_invocations, err));
                }
            };

            match reply {
                ModelReply::Final { text } => {
                    session.append(TurnRecord::assistant(&text, agent.name()));
                    info!(turn_id = %turn_id, agent = %agent.name(), "Turn complete");
                    return Ok(TurnResult::success(text, agent.name(), tool_invocations));
                }

                ModelReply::ToolCall {
                    id,
                    name,
                    arguments,
                } => {
                    tool_calls_made += 1;
                    if tool_calls_made > config.max_tool_calls {
                        warn!(
                            turn_id = %turn_id,
                            agent = %agent.name(),
                            limit = config.max_tool_calls,
                            "Tool loop bound exceeded"
                        );
                        return Ok(TurnResult::aborted(
                            agent.name(),
                            tool_invocations,
                            AgentError::ToolLoopExceeded {
                                limit: config.max_tool_calls,
                            },
                        ));
                    }

                    let response = service
                        .clone()
                        .oneshot(ToolRequest {
                            turn_id: turn_id.clone(),
                            agent: agent.name().to_string(),
                            call_id: id.clone(),
                            tool_name: name.clone(),
                            arguments: arguments.clone(),
                        })
                        .await?;

                    let mut record = ToolCallRecord {
                        id,
                        tool_name: name,
                        arguments,
                        result: None,
                        error: None,
                    };
                    let content = if let Some(err) = response.outcome.error {
                        record = record.with_error(&err);
                        format!("Error: {}", err)
                    } else {
                        let output = response.outcome.result.unwrap_or(serde_json::Value::Null);
                        record = record.with_result(output.clone());
                        serde_json::to_string(&output).unwrap_or_else(|_| "null".to_string())
                    };

                    session.append(TurnRecord::tool(content, agent.name(), record.clone()));
                    tool_invocations.push(record);
                }

                ModelReply::Handoff { target, reason } => {
                    handoffs_made += 1;
                    if handoffs_made > config.max_handoffs {
                        warn!(
                            turn_id = %turn_id,
                            agent = %agent.name(),
                            limit = config.max_handoffs,
                            "Handoff loop bound exceeded"
                        );
                        return Ok(TurnResult::aborted(
                            agent.name(),
                            tool_invocations,
                            AgentError::HandoffLoopExceeded {
                                limit: config.max_handoffs,
                            },
                        ));
                    }

                    if agent.handoff_to(&target).is_none() {
                        warn!(
                            turn_id = %turn_id,
                            from = %agent.name(),
                            to = %target,
                            "Handoff target not in the agent's declared edges"
                        );
                        return Ok(TurnResult::aborted(
                            agent.name(),
                            tool_invocations,
                            AgentError::InvalidHandoff {
                                from: agent.name().to_string(),
                                to: target,
                            },
                        ));
                    }

                    // The graph rejected dangling targets at setup, so a
                    // declared edge always resolves.
                    let next = graph
                        .get(&target)
                        .cloned()
                        .ok_or_else(|| AgentError::UnknownAgent {
                            name: target.clone(),
                        })?;

                    let note = match reason {
                        Some(reason) => format!(
                            "Transferring from {} to {}: {}",
                            agent.name(),
                            target,
                            reason
                        ),
                        None => format!("Transferring from {} to {}", agent.name(), target),
                    };
                    session.append(TurnRecord::system(note));
                    session.set_active_agent(&target, graph)?;
                    info!(turn_id = %turn_id, from = %agent.name(), to = %target, "Handoff");

                    agent = next;
                    service = ToolService::new(Arc::new(agent.tool_registry()?));
                    // A fresh dispatch run starts for the new agent
                    tool_calls_made = 0;
                }
            }
        }
    }
}
