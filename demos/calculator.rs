//! Offline walkthrough of a full turn using a scripted capability:
//! the assistant hands off to a math expert, the expert runs the
//! calculator tool, and the turn completes with the computed answer.
//! No API key required.

use std::sync::Arc;

use agentflow::{Agent, AgentGraph, FunctionTool, RunConfig, Runner, ScriptedModel};
use serde_json::json;

#[path = "support/calc.rs"]
mod calc;
use calc::eval_expression;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agentflow=debug".into()),
        )
        .init();

    let calculate = Arc::new(FunctionTool::simple(
        "calculate",
        "Evaluate a mathematical expression",
        |expression: String| match eval_expression(&expression) {
            Ok(value) if value.fract() == 0.0 => format!("Result: {}", value as i64),
            Ok(value) => format!("Result: {}", value),
            Err(e) => format!("Error calculating: {}", e),
        },
    ));

    let assistant = Agent::simple("Assistant", "You are a helpful AI assistant.")
        .with_handoff("MathExpert", "Transfer for complex calculations")?;
    let math_expert = Agent::simple("MathExpert", "You are a mathematics expert.")
        .with_tool(calculate)
        .with_handoff("Assistant", "Return to main assistant")?;

    let graph = AgentGraph::new(vec![assistant, math_expert])?;
    let mut session = Runner::start_session(&graph, "Assistant")?;

    // A canned run: hand off to the expert, compute, answer.
    let model = ScriptedModel::new()
        .with_handoff("MathExpert")
        .with_tool_call("calculate", json!({"input": "12*7"}))
        .with_final("12 * 7 = 84");
    let config = RunConfig::default().with_model(Arc::new(model));

    let result = Runner::run_turn(&graph, &mut session, "What is 12 * 7?", &config).await?;

    println!("responding agent: {}", result.responding_agent);
    for call in &result.tool_invocations {
        println!(
            "tool call: {}({}) -> {}",
            call.tool_name,
            call.arguments,
            call.result
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| format!("error: {:?}", call.error)),
        );
    }
    if let Some(text) = &result.final_text {
        println!("final answer: {}", text);
    }

    println!("\nsession history ({} records):", session.len());
    for (i, record) in session.history().iter().enumerate() {
        println!("  {:02} {:?} | {}", i, record.role, record.content);
    }

    Ok(())
}
