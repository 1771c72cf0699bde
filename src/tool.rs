//! Tool system: schema-described callables and the registry that names them
//!
//! Tools are the only way agents act on the outside world. The registry is
//! side-effect-free bookkeeping: it owns the name → tool table and wraps
//! handler failures so a single failing tool can never abort a turn.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::{AgentError, Result};

/// Trait for all tools that agents may invoke.
#[async_trait]
pub trait Tool: Send + Sync + Debug {
    /// Name of the tool; identity within a registry
    fn name(&self) -> &str;

    /// Human/model-readable description of what the tool does
    fn description(&self) -> &str;

    /// JSON schema for the tool's parameters
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the given arguments
    async fn execute(&self, arguments: Value) -> Result<Value>;
}

/// Outcome of invoking a tool through the registry.
///
/// Either `result` or `error` is populated. Handler failures land in `error`
/// rather than propagating, so the orchestrator can feed them back to the
/// model as context.
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub result: Option<Value>,
    pub error: Option<String>,
}

impl ToolOutcome {
    pub fn ok(result: Value) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(message.into()),
        }
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }
}

/// A function-based tool with a hand-written parameter schema.
#[derive(Clone)]
pub struct FunctionTool {
    name: String,
    description: String,
    parameters_schema: Value,
    function: Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>,
}

impl std::fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters_schema", &self.parameters_schema)
            .finish()
    }
}

impl FunctionTool {
    /// Create a new function tool
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters_schema: Value,
        function: F,
    ) -> Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters_schema,
            function: Arc::new(function),
        }
    }

    /// Create a function tool from a simple string-to-string function.
    ///
    /// The argument object has a single required `input` string field.
    pub fn simple<F>(name: &str, description: &str, function: F) -> Self
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        let wrapped = move |args: Value| {
            let input = args
                .get("input")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            Ok(Value::String(function(input)))
        };

        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "input": {
                        "type": "string",
                        "description": "Input to the function"
                    }
                },
                "required": ["input"]
            }),
            function: Arc::new(wrapped),
        }
    }
}

#[async_trait]
impl Tool for FunctionTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        self.parameters_schema.clone()
    }

    async fn execute(&self, arguments: Value) -> Result<Value> {
        (self.function)(arguments)
    }
}

/// Build a tool whose parameter schema is derived from a typed argument struct.
///
/// ```rust
/// use agentflow::tool::typed_tool;
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize, JsonSchema)]
/// struct AddArgs {
///     a: f64,
///     b: f64,
/// }
///
/// let add = typed_tool("add", "Add two numbers", |args: AddArgs| {
///     Ok(serde_json::json!({ "sum": args.a + args.b }))
/// });
/// ```
pub fn typed_tool<A, R, F>(name: &str, description: &str, handler: F) -> FunctionTool
where
    A: DeserializeOwned + JsonSchema + Send + 'static,
    R: Serialize + Send + 'static,
    F: Fn(A) -> Result<R> + Send + Sync + 'static,
{
    let schema = schemars::schema_for!(A);
    let params = serde_json::to_value(schema.schema).unwrap_or_else(|_| serde_json::json!({}));
    let wrapped = move |raw: Value| {
        let args: A = serde_json::from_value(raw)?;
        let out = handler(args)?;
        Ok(serde_json::to_value(out)?)
    };
    FunctionTool::new(name, description, params, wrapped)
}

/// Macro to create a simple function tool from a closure
#[macro_export]
macro_rules! function_tool {
    ($name:expr, $description:expr, $func:expr) => {
        $crate::tool::FunctionTool::simple($name, $description, $func)
    };
}

/// Named lookup table over tools. Registration order is preserved for
/// advertisement to the model capability.
#[derive(Debug, Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a tool list, rejecting duplicate names.
    pub fn from_tools(tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Result<Self> {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    /// Register a tool. Fails if a tool with the same name already exists;
    /// registered tools are immutable.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(AgentError::DuplicateTool { name });
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Tools in registration order
    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name.
    ///
    /// Returns `UnknownTool` when the name is absent. Handler failures are
    /// wrapped into the outcome's `error` field rather than propagated.
    pub async fn invoke(&self, name: &str, arguments: Value) -> Result<ToolOutcome> {
        let tool = self.get(name).ok_or_else(|| AgentError::UnknownTool {
            name: name.to_string(),
        })?;

        match tool.execute(arguments).await {
            Ok(result) => Ok(ToolOutcome::ok(result)),
            Err(e) => Ok(ToolOutcome::err(e.to_string())),
        }
    }
}
