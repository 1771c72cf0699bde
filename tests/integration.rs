//! End-to-end turn scenarios driven through the public API

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::{Arc, Mutex};

use agentflow::{
    Agent, AgentError, AgentGraph, FunctionTool, ModelCapability, ModelReply, Result, Role,
    RunConfig, Runner, ScriptedModel, TurnRecord,
};

#[path = "../demos/support/calc.rs"]
mod calc;
use calc::eval_expression;

fn calculate_tool() -> Arc<FunctionTool> {
    Arc::new(FunctionTool::simple(
        "calculate",
        "Evaluate a mathematical expression",
        |expression: String| match eval_expression(&expression) {
            Ok(value) if value.fract() == 0.0 => format!("{}", value as i64),
            Ok(value) => format!("{}", value),
            Err(e) => format!("Error calculating: {}", e),
        },
    ))
}

/// The two-agent setup: Assistant ⇄ MathExpert.
fn triage_graph() -> AgentGraph {
    let assistant = Agent::simple(
        "Assistant",
        "You are a helpful AI assistant with access to various tools.",
    )
    .with_tool(calculate_tool())
    .with_handoff(
        "MathExpert",
        "Transfer to math expert for complex calculations",
    )
    .unwrap();

    let math_expert = Agent::simple(
        "MathExpert",
        "You are a mathematics expert. Use the calculate tool for computations.",
    )
    .with_tool(calculate_tool())
    .with_handoff("Assistant", "Return to main assistant")
    .unwrap();

    AgentGraph::new(vec![assistant, math_expert]).unwrap()
}

/// Capability that records which agent each dispatch went to before
/// delegating to a scripted queue.
struct RecordingModel {
    inner: ScriptedModel,
    dispatched_to: Mutex<Vec<String>>,
}

impl RecordingModel {
    fn new(inner: ScriptedModel) -> Self {
        Self {
            inner,
            dispatched_to: Mutex::new(Vec::new()),
        }
    }

    fn dispatches(&self) -> Vec<String> {
        self.dispatched_to.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelCapability for RecordingModel {
    async fn send(&self, agent: &Agent, history: &[TurnRecord]) -> Result<ModelReply> {
        self.dispatched_to
            .lock()
            .unwrap()
            .push(agent.name().to_string());
        self.inner.send(agent, history).await
    }
}

/// Capability that requests the same tool call forever.
struct RelentlessToolCaller;

#[async_trait]
impl ModelCapability for RelentlessToolCaller {
    async fn send(&self, _agent: &Agent, _history: &[TurnRecord]) -> Result<ModelReply> {
        Ok(ModelReply::tool_call(
            "calculate",
            json!({"input": "1+1"}),
        ))
    }
}

#[tokio::test]
async fn handoff_to_math_expert_scenario() {
    let graph = triage_graph();
    let mut session = Runner::start_session(&graph, "Assistant").unwrap();

    let model = ScriptedModel::new()
        .with_handoff("MathExpert")
        .with_tool_call("calculate", json!({"input": "12*7"}))
        .with_final("84");
    let config = RunConfig::default().with_model(Arc::new(model));

    let result = Runner::run_turn(&graph, &mut session, "What is 12 * 7?", &config)
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.final_text.as_deref(), Some("84"));
    assert_eq!(result.responding_agent, "MathExpert");
    assert_eq!(result.tool_invocations.len(), 1);
    assert_eq!(result.tool_invocations[0].tool_name, "calculate");
    assert_eq!(result.tool_invocations[0].result, Some(json!("84")));

    // user, system transfer note, tool, assistant
    let roles: Vec<Role> = session.history().iter().map(|r| r.role).collect();
    assert_eq!(roles, vec![Role::User, Role::System, Role::Tool, Role::Assistant]);
    assert!(session.history()[1].content.contains("MathExpert"));
    assert_eq!(session.active_agent(), "MathExpert");
}

#[tokio::test]
async fn clear_session_resets_to_starting_agent() {
    let graph = triage_graph();
    let mut session = Runner::start_session(&graph, "Assistant").unwrap();

    // Five turns, the first of which hands off to the expert.
    let model = ScriptedModel::new()
        .with_handoff("MathExpert")
        .with_final("turn 1")
        .with_final("turn 2")
        .with_final("turn 3")
        .with_final("turn 4")
        .with_final("turn 5");
    let config = RunConfig::default().with_model(Arc::new(model));

    for i in 1..=5 {
        let result = Runner::run_turn(&graph, &mut session, format!("message {}", i), &config)
            .await
            .unwrap();
        assert!(result.is_success());
    }
    assert_eq!(session.active_agent(), "MathExpert");
    assert!(session.len() > 0);

    Runner::clear_session(&mut session);
    assert_eq!(session.len(), 0);
    assert_eq!(session.active_agent(), "Assistant");

    // The next turn dispatches to the original starting agent.
    let recording = Arc::new(RecordingModel::new(
        ScriptedModel::new().with_final("back at the start"),
    ));
    let config = RunConfig::default().with_model(recording.clone());
    let result = Runner::run_turn(&graph, &mut session, "hello again", &config)
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(recording.dispatches(), vec!["Assistant".to_string()]);
}

#[tokio::test]
async fn tool_loop_aborts_at_bound_plus_one() {
    let graph = triage_graph();
    let mut session = Runner::start_session(&graph, "Assistant").unwrap();

    let bound = 4;
    let config = RunConfig::default()
        .with_model(Arc::new(RelentlessToolCaller))
        .with_max_tool_calls(bound);

    let result = Runner::run_turn(&graph, &mut session, "loop", &config)
        .await
        .unwrap();

    assert!(matches!(
        result.error(),
        Some(AgentError::ToolLoopExceeded { limit }) if *limit == bound
    ));
    // Exactly `bound` executions happened before the abort.
    assert_eq!(result.tool_invocations.len(), bound);
    assert!(result.final_text.is_none());
}

#[tokio::test]
async fn handoff_resets_consecutive_tool_counter() {
    let graph = triage_graph();
    let mut session = Runner::start_session(&graph, "Assistant").unwrap();

    // Two tool calls, a handoff, then two more tool calls under a bound of
    // two: legal, because the counter is per dispatch run.
    let model = ScriptedModel::new()
        .with_tool_call("calculate", json!({"input": "1+1"}))
        .with_tool_call("calculate", json!({"input": "2+2"}))
        .with_handoff("MathExpert")
        .with_tool_call("calculate", json!({"input": "3+3"}))
        .with_tool_call("calculate", json!({"input": "4+4"}))
        .with_final("done");
    let config = RunConfig::default()
        .with_model(Arc::new(model))
        .with_max_tool_calls(2);

    let result = Runner::run_turn(&graph, &mut session, "work", &config)
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.tool_invocations.len(), 4);
    assert_eq!(result.responding_agent, "MathExpert");
}

#[tokio::test]
async fn invalid_handoff_leaves_active_agent_unchanged() {
    let graph = triage_graph();
    let mut session = Runner::start_session(&graph, "Assistant").unwrap();

    // "Assistant" only declares an edge to MathExpert.
    let model = ScriptedModel::new().with_handoff("Assistant2");
    let config = RunConfig::default().with_model(Arc::new(model));

    let result = Runner::run_turn(&graph, &mut session, "go", &config)
        .await
        .unwrap();

    assert!(matches!(
        result.error(),
        Some(AgentError::InvalidHandoff { .. })
    ));
    assert_eq!(session.active_agent(), "Assistant");

    // The session stays usable.
    let config =
        RunConfig::default().with_model(Arc::new(ScriptedModel::new().with_final("still here")));
    let result = Runner::run_turn(&graph, &mut session, "ok", &config)
        .await
        .unwrap();
    assert!(result.is_success());
}

#[tokio::test]
async fn tool_error_is_fed_back_not_raised() {
    let graph = triage_graph();
    let mut session = Runner::start_session(&graph, "Assistant").unwrap();

    let model = ScriptedModel::new()
        .with_tool_call("calculate", json!({"input": "1/0"}))
        .with_final("That division is undefined.");
    let config = RunConfig::default().with_model(Arc::new(model));

    let result = Runner::run_turn(&graph, &mut session, "divide by zero", &config)
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.tool_invocations.len(), 1);
    // The calculate tool reports the failure as its output string.
    assert_eq!(
        result.tool_invocations[0].result,
        Some(json!("Error calculating: division by zero"))
    );
}

#[tokio::test]
async fn history_grows_within_turns_and_resets_only_on_clear() {
    let graph = triage_graph();
    let mut session = Runner::start_session(&graph, "Assistant").unwrap();
    let mut last_len = 0;

    for i in 0..3 {
        let config = RunConfig::default()
            .with_model(Arc::new(ScriptedModel::new().with_final(format!("reply {}", i))));
        Runner::run_turn(&graph, &mut session, format!("msg {}", i), &config)
            .await
            .unwrap();
        assert!(session.len() > last_len);
        last_len = session.len();
    }

    Runner::clear_session(&mut session);
    assert_eq!(session.len(), 0);
}

#[tokio::test]
async fn independent_sessions_share_immutable_graph() {
    let graph = Arc::new(triage_graph());

    let mut handles = Vec::new();
    for i in 0..4 {
        let graph = graph.clone();
        handles.push(tokio::spawn(async move {
            let mut session = Runner::start_session(&graph, "Assistant")?;
            let config = RunConfig::default()
                .with_model(Arc::new(ScriptedModel::new().with_final(format!("reply {}", i))));
            Runner::run_turn(&graph, &mut session, format!("hello {}", i), &config).await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert!(result.is_success());
    }
}

#[test]
fn expression_evaluator_sanity() {
    assert_eq!(eval_expression("12*7").unwrap(), 84.0);
    assert_eq!(eval_expression("2+3*4").unwrap(), 14.0);
    assert_eq!(eval_expression("10-4/2").unwrap(), 8.0);
    assert!(eval_expression("1/0").is_err());
    assert!(eval_expression("two plus two").is_err());
    assert!(eval_expression("").is_err());
    assert!(eval_expression("2+").is_err());
}

#[test]
fn expression_evaluator_handles_unary_minus() {
    assert_eq!(eval_expression("-5").unwrap(), -5.0);
    assert_eq!(eval_expression("2--3").unwrap(), 5.0);
    assert_eq!(eval_expression("2*-3").unwrap(), -6.0);
    assert_eq!(eval_expression("-2 + -3").unwrap(), -5.0);
    assert_eq!(eval_expression("-12*7").unwrap(), -84.0);
}
