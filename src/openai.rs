//! OpenAI-backed model capability
//!
//! Adapts the chat-completions API to the [`ModelCapability`] contract.
//! Regular tools are advertised as function tools; handoff edges are
//! advertised alongside them as `transfer_to_<agent>` functions. A reply
//! calling one of those functions surfaces as [`ModelReply::Handoff`] and is
//! validated by the runner against the agent's declared edges, so the
//! adapter itself stays policy-free.

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolType,
        CreateChatCompletionRequestArgs, FunctionCall, FunctionObjectArgs,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::Value;

use crate::agent::Agent;
use crate::error::{AgentError, Result};
use crate::items::{Role, TurnRecord};
use crate::model::{ModelCapability, ModelReply};

/// Function-name prefix under which handoff edges are advertised.
const HANDOFF_PREFIX: &str = "transfer_to_";

/// Model capability backed by the OpenAI chat-completions API.
#[derive(Debug)]
pub struct OpenAiModel {
    client: Client<OpenAIConfig>,
}

impl OpenAiModel {
    /// Create a capability from an existing client.
    pub fn new(client: Client<OpenAIConfig>) -> Self {
        Self { client }
    }

    /// Create a capability from the environment.
    ///
    /// Loads `.env` if present and requires `OPENAI_API_KEY` to be set.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        if key.is_empty() {
            return Err(AgentError::ModelCapability {
                message: "OPENAI_API_KEY not found in environment variables".to_string(),
            });
        }
        Ok(Self {
            client: Client::new(),
        })
    }

    /// Convert the session history into wire messages, prefixed by the
    /// agent's system record.
    ///
    /// A `Tool` record expands to the assistant tool-call message followed
    /// by the tool result message; the API requires the pair in that order.
    fn convert_history(
        &self,
        agent: &Agent,
        history: &[TurnRecord],
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(history.len() + 1);

        let system = agent.build_system_record();
        messages.push(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system.content)
                .build()?
                .into(),
        );

        for record in history {
            match record.role {
                Role::User => messages.push(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(record.content.clone())
                        .build()?
                        .into(),
                ),
                Role::Assistant => messages.push(
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .content(record.content.clone())
                        .build()?
                        .into(),
                ),
                Role::System => messages.push(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(record.content.clone())
                        .build()?
                        .into(),
                ),
                Role::Tool => {
                    let Some(call) = &record.tool_call else {
                        continue;
                    };
                    messages.push(
                        ChatCompletionRequestAssistantMessageArgs::default()
                            .tool_calls(vec![ChatCompletionMessageToolCall {
                                id: call.id.clone(),
                                r#type: ChatCompletionToolType::Function,
                                function: FunctionCall {
                                    name: call.tool_name.clone(),
                                    arguments: call.arguments.to_string(),
                                },
                            }])
                            .build()?
                            .into(),
                    );
                    messages.push(
                        ChatCompletionRequestToolMessageArgs::default()
                            .content(record.content.clone())
                            .tool_call_id(call.id.clone())
                            .build()?
                            .into(),
                    );
                }
            }
        }

        Ok(messages)
    }

    /// Advertise the agent's tools plus its handoff edges as function tools.
    fn convert_tools(&self, agent: &Agent) -> Result<Vec<ChatCompletionTool>> {
        let mut tools = Vec::with_capacity(agent.tools().len() + agent.handoffs().len());

        for tool in agent.tools() {
            tools.push(
                ChatCompletionToolArgs::default()
                    .r#type(ChatCompletionToolType::Function)
                    .function(
                        FunctionObjectArgs::default()
                            .name(tool.name())
                            .description(tool.description())
                            .parameters(tool.parameters_schema())
                            .build()?,
                    )
                    .build()?,
            );
        }

        for handoff in agent.handoffs() {
            tools.push(
                ChatCompletionToolArgs::default()
                    .r#type(ChatCompletionToolType::Function)
                    .function(
                        FunctionObjectArgs::default()
                            .name(format!("{}{}", HANDOFF_PREFIX, handoff.target))
                            .description(handoff.description.clone())
                            .parameters(serde_json::json!({
                                "type": "object",
                                "properties": {
                                    "reason": {
                                        "type": "string",
                                        "description": "Reason for the handoff"
                                    }
                                }
                            }))
                            .build()?,
                    )
                    .build()?,
            );
        }

        Ok(tools)
    }
}

#[async_trait]
impl ModelCapability for OpenAiModel {
    /// Dispatch the agent's context and yield exactly one reply.
    ///
    /// The capability contract is one reply per dispatch, so parallel tool
    /// calls are disabled in the request and only the first tool call of a
    /// choice is surfaced; the model re-requests any remaining work on the
    /// next dispatch once the result is in context.
    async fn send(&self, agent: &Agent, history: &[TurnRecord]) -> Result<ModelReply> {
        let messages = self.convert_history(agent, history)?;

        let mut request = CreateChatCompletionRequestArgs::default();
        request.model(&agent.config.model).messages(messages);

        let tools = self.convert_tools(agent)?;
        if !tools.is_empty() {
            request.tools(tools);
            request.parallel_tool_calls(false);
        }
        if let Some(temperature) = agent.config.temperature {
            request.temperature(temperature);
        }
        if let Some(max_tokens) = agent.config.max_tokens {
            request.max_completion_tokens(max_tokens);
        }

        let response = self.client.chat().create(request.build()?).await?;

        let choice =
            response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| AgentError::ModelCapability {
                    message: "no choices in response".to_string(),
                })?;

        if let Some(call) = choice
            .message
            .tool_calls
            .as_ref()
            .and_then(|calls| calls.first())
        {
            let arguments: Value =
                serde_json::from_str(&call.function.arguments).unwrap_or(Value::Null);

            if let Some(target) = call.function.name.strip_prefix(HANDOFF_PREFIX) {
                let reason = arguments
                    .get("reason")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string());
                return Ok(ModelReply::Handoff {
                    target: target.to_string(),
                    reason,
                });
            }

            return Ok(ModelReply::ToolCall {
                id: call.id.clone(),
                name: call.function.name.clone(),
                arguments,
            });
        }

        match choice.message.content {
            Some(text) if !text.is_empty() => Ok(ModelReply::Final { text }),
            _ => Err(AgentError::ModelCapability {
                message: "model returned neither content nor tool calls".to_string(),
            }),
        }
    }
}
