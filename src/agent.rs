//! Agents and the handoff graph over them
//!
//! An [`Agent`] is a named persona: instructions, a bound tool list, and the
//! handoff edges it may follow. Agents are built once at setup and are
//! immutable for the lifetime of a session; an [`AgentGraph`] collects them
//! into a validated adjacency structure that the runner consults at turn time.
//!
//! A handoff is an edge over agent *names*, not an owned sub-agent. Cycles
//! are permitted (assistant ⇄ expert is a valid two-cycle); what is rejected
//! is a degenerate self-edge, a duplicate agent name, or an edge pointing at
//! an agent the graph does not contain.
//!
//! ## Example: a triage pair
//!
//! ```rust
//! use agentflow::{Agent, AgentGraph};
//!
//! let assistant = Agent::simple("Assistant", "You are a helpful assistant.")
//!     .with_handoff("MathExpert", "Transfer for complex calculations")
//!     .unwrap();
//! let expert = Agent::simple("MathExpert", "You are a mathematics expert.")
//!     .with_handoff("Assistant", "Return to the main assistant")
//!     .unwrap();
//!
//! let graph = AgentGraph::new(vec![assistant, expert]).unwrap();
//! assert!(graph.contains("MathExpert"));
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::items::TurnRecord;
use crate::tool::{Tool, ToolRegistry};

/// A declared handoff edge: the target agent's name plus a description that
/// helps the source agent decide when to delegate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    pub target: String,
    pub description: String,
}

impl Handoff {
    pub fn new(target: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            description: description.into(),
        }
    }
}

/// Complete configuration for an [`Agent`].
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// The agent's name, used for identification, attribution, and as the
    /// node id in the handoff graph.
    pub name: String,

    /// System instructions that define the agent's persona and behavior.
    pub instructions: String,

    /// Tools the agent may invoke, in advertisement order.
    pub tools: Vec<Arc<dyn Tool>>,

    /// Outgoing handoff edges. Appended only during setup; the first
    /// description recorded for a target is authoritative.
    pub handoffs: Vec<Handoff>,

    /// Model to request from the provider for this agent.
    pub model: String,

    /// Sampling temperature, if the provider supports it.
    pub temperature: Option<f32>,

    /// Cap on generated tokens per response.
    pub max_tokens: Option<u32>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "Assistant".to_string(),
            instructions: "You are a helpful assistant.".to_string(),
            tools: vec![],
            handoffs: vec![],
            model: "gpt-4o-mini".to_string(),
            temperature: None,
            max_tokens: None,
        }
    }
}

/// A named participant in a multi-agent workflow.
///
/// Cheap to clone; designed to be built once and shared behind an
/// [`AgentGraph`] for the lifetime of a session.
#[derive(Debug, Clone)]
pub struct Agent {
    pub config: AgentConfig,
}

impl Agent {
    pub fn new(config: AgentConfig) -> Self {
        Self { config }
    }

    /// Create an agent with just a name and instructions; everything else
    /// takes default values.
    pub fn simple(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self::new(AgentConfig {
            name: name.into(),
            instructions: instructions.into(),
            ..Default::default()
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.config.tools.push(tool);
        self
    }

    pub fn with_tools(mut self, tools: Vec<Arc<dyn Tool>>) -> Self {
        self.config.tools.extend(tools);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.max_tokens = Some(max_tokens);
        self
    }

    /// Append a handoff edge during setup.
    ///
    /// Fails with [`AgentError::SelfHandoff`] when the target is the agent
    /// itself. Adding the same target twice is tolerated and collapses to one
    /// logical edge; the first description wins.
    pub fn add_handoff(
        &mut self,
        target: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<()> {
        let target = target.into();
        if target == self.config.name {
            return Err(AgentError::SelfHandoff {
                agent: self.config.name.clone(),
            });
        }
        if self.handoff_to(&target).is_none() {
            self.config.handoffs.push(Handoff::new(target, description));
        }
        Ok(())
    }

    /// Builder form of [`Agent::add_handoff`].
    pub fn with_handoff(
        mut self,
        target: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self> {
        self.add_handoff(target, description)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn instructions(&self) -> &str {
        &self.config.instructions
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.config.tools
    }

    pub fn handoffs(&self) -> &[Handoff] {
        &self.config.handoffs
    }

    pub fn has_tools(&self) -> bool {
        !self.config.tools.is_empty()
    }

    pub fn has_handoffs(&self) -> bool {
        !self.config.handoffs.is_empty()
    }

    /// The outgoing edge to `target`, if this agent declares one.
    pub fn handoff_to(&self, target: &str) -> Option<&Handoff> {
        self.config.handoffs.iter().find(|h| h.target == target)
    }

    /// Build the registry of this agent's tools, rejecting duplicate names.
    pub fn tool_registry(&self) -> Result<ToolRegistry> {
        ToolRegistry::from_tools(self.config.tools.iter().cloned())
    }

    /// Construct the system record priming the model with the agent's
    /// instructions and its available tools and handoff targets.
    pub fn build_system_record(&self) -> TurnRecord {
        let mut content = self.config.instructions.clone();

        if !self.config.tools.is_empty() {
            content.push_str("\n\nYou have access to the following tools:\n");
            for tool in &self.config.tools {
                content.push_str(&format!("- {}: {}\n", tool.name(), tool.description()));
            }
        }

        if !self.config.handoffs.is_empty() {
            content.push_str("\n\nYou can hand off to the following agents:\n");
            for handoff in &self.config.handoffs {
                content.push_str(&format!("- {}: {}\n", handoff.target, handoff.description));
            }
        }

        TurnRecord::system(content)
    }
}

/// Validated adjacency structure over a set of agents.
///
/// Built once at setup; immutable and shareable afterwards. Construction
/// rejects duplicate agent names, dangling handoff targets, and per-agent
/// duplicate tool names, so none of these can surface mid-turn.
#[derive(Debug, Clone)]
pub struct AgentGraph {
    agents: HashMap<String, Arc<Agent>>,
    /// Insertion order, kept for stable iteration
    order: Vec<String>,
}

impl AgentGraph {
    pub fn new(agents: Vec<Agent>) -> Result<Self> {
        let mut map: HashMap<String, Arc<Agent>> = HashMap::new();
        let mut order = Vec::with_capacity(agents.len());

        for agent in agents {
            let name = agent.name().to_string();
            if map.contains_key(&name) {
                return Err(AgentError::DuplicateAgent { name });
            }
            // Surfaces duplicate tool names at setup rather than at dispatch
            agent.tool_registry()?;
            order.push(name.clone());
            map.insert(name, Arc::new(agent));
        }

        for agent in map.values() {
            for handoff in agent.handoffs() {
                if handoff.target == agent.name() {
                    return Err(AgentError::SelfHandoff {
                        agent: agent.name().to_string(),
                    });
                }
                if !map.contains_key(&handoff.target) {
                    return Err(AgentError::UnknownAgent {
                        name: handoff.target.clone(),
                    });
                }
            }
        }

        Ok(Self { agents: map, order })
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Agent>> {
        self.agents.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Agent names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    /// All agent names reachable from `start` through zero or more handoff
    /// edges. The session invariant is that the active agent always lies in
    /// this set for the session's starting agent.
    pub fn reachable_from(&self, start: &str) -> Result<HashSet<String>> {
        if !self.contains(start) {
            return Err(AgentError::UnknownAgent {
                name: start.to_string(),
            });
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut stack = vec![start.to_string()];
        while let Some(name) = stack.pop() {
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Some(agent) = self.get(&name) {
                for handoff in agent.handoffs() {
                    if !seen.contains(&handoff.target) {
                        stack.push(handoff.target.clone());
                    }
                }
            }
        }
        Ok(seen)
    }
}
