//! Interactive two-agent chat: an assistant that can hand off to a math
//! expert, both backed by the OpenAI capability.
//!
//! Requires `OPENAI_API_KEY` (a `.env` file is honored). Commands: `quit`
//! or `exit` to end, `clear` to reset the session.

use std::io::{BufRead, Write};
use std::sync::Arc;

use agentflow::{Agent, AgentGraph, FunctionTool, OpenAiModel, RunConfig, Runner};

#[path = "support/calc.rs"]
mod calc;
use calc::eval_expression;

fn build_graph() -> agentflow::Result<AgentGraph> {
    let calculate = Arc::new(FunctionTool::simple(
        "calculate",
        "Evaluate a mathematical expression, e.g. \"2 + 2\" or \"10 * 5\"",
        |expression: String| match eval_expression(&expression) {
            Ok(value) if value.fract() == 0.0 => format!("Result: {}", value as i64),
            Ok(value) => format!("Result: {}", value),
            Err(e) => format!("Error calculating: {}", e),
        },
    ));

    let get_current_time = Arc::new(FunctionTool::simple(
        "get_current_time",
        "Get the current time",
        |_| chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    ));

    let assistant = Agent::simple(
        "Assistant",
        "You are a helpful AI assistant with access to various tools.\n\
         You can answer general questions, get the current time, perform\n\
         mathematical calculations, and hand off to a specialized math expert\n\
         for complex calculations. Be friendly and helpful!",
    )
    .with_model("gpt-4o-mini")
    .with_tools(vec![get_current_time, calculate.clone()])
    .with_handoff(
        "MathExpert",
        "Transfer to math expert for complex calculations or mathematical explanations",
    )?;

    let math_expert = Agent::simple(
        "MathExpert",
        "You are a mathematics expert. Help users solve complex mathematical\n\
         problems step by step. Use the calculate tool for computations.\n\
         When done, return control to the main assistant.",
    )
    .with_model("gpt-4o-mini")
    .with_tool(calculate)
    .with_handoff("Assistant", "Return to main assistant")?;

    AgentGraph::new(vec![assistant, math_expert])
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agentflow=info".into()),
        )
        .init();

    let model = Arc::new(OpenAiModel::from_env()?);
    let graph = build_graph()?;
    let config = RunConfig::default().with_model(model);
    let mut session = Runner::start_session(&graph, "Assistant")?;

    println!("Multi-agent chat (Assistant + MathExpert)");
    println!("Commands: 'quit' or 'exit' to end, 'clear' to reset the session\n");

    let stdin = std::io::stdin();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = stdin.lock().lines().next() else {
            break;
        };
        let input = line?.trim().to_string();

        match input.to_lowercase().as_str() {
            "" => continue,
            "quit" | "exit" | "q" => break,
            "clear" => {
                Runner::clear_session(&mut session);
                println!("Session cleared.\n");
                continue;
            }
            _ => {}
        }

        let result = Runner::run_turn(&graph, &mut session, input, &config).await?;
        match (&result.final_text, result.error()) {
            (Some(text), _) => {
                println!("\n{}: {}\n", result.responding_agent, text);
            }
            (None, Some(err)) => {
                eprintln!("\nTurn aborted: {}\n", err);
            }
            (None, None) => unreachable!("turn neither completed nor aborted"),
        }
        for call in &result.tool_invocations {
            println!("  [tool] {} -> {}", call.tool_name, call.error.as_deref().unwrap_or("ok"));
        }
    }

    println!("Goodbye!");
    Ok(())
}
