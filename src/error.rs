//! Error types for the orchestration core

use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, AgentError>;

/// Main error type for the orchestration core
#[derive(Debug, Error)]
pub enum AgentError {
    /// A tool with the same name is already registered
    #[error("duplicate tool: {name}")]
    DuplicateTool { name: String },

    /// No tool with this name is registered
    #[error("unknown tool: {name}")]
    UnknownTool { name: String },

    /// A tool handler failed; recovered locally and fed back into context
    #[error("tool execution error: {message}")]
    ToolExecution { message: String },

    /// Two agents in one graph share a name
    #[error("duplicate agent: {name}")]
    DuplicateAgent { name: String },

    /// No agent with this name exists in the graph
    #[error("unknown agent: {name}")]
    UnknownAgent { name: String },

    /// An agent declared a handoff edge to itself
    #[error("agent '{agent}' cannot hand off to itself")]
    SelfHandoff { agent: String },

    /// A handoff was requested to a target outside the current agent's edges
    #[error("invalid handoff from '{from}' to '{to}'")]
    InvalidHandoff { from: String, to: String },

    /// Too many consecutive tool-call iterations in one turn
    #[error("tool loop exceeded: {limit} consecutive tool calls")]
    ToolLoopExceeded { limit: usize },

    /// Too many handoffs in one turn
    #[error("handoff loop exceeded: {limit} handoffs")]
    HandoffLoopExceeded { limit: usize },

    /// The external model capability failed; fatal to the turn
    #[error("model capability error: {message}")]
    ModelCapability { message: String },

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<async_openai::error::OpenAIError> for AgentError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        AgentError::ModelCapability {
            message: err.to_string(),
        }
    }
}
