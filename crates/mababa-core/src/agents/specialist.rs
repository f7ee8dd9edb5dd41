//! Specialist agent invocation

use super::config::AgentDefinition;
use crate::error::Result;
use mababa_llm::{
    CompletionRequest, LlmProvider, Message, ToolChoice, ToolCompletionRequest,
};
use mababa_tools::{ToolRegistry, ToolResult};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Default number of tool-calling rounds before the agent must answer
pub const DEFAULT_MAX_TOOL_ROUNDS: u32 = 4;

/// Conversation handed to an agent
#[derive(Debug, Clone, Default)]
pub struct AgentContext {
    /// Earlier turns (user and assistant messages)
    pub history: Vec<Message>,
    /// The current request
    pub request: String,
}

impl AgentContext {
    /// Context with no history
    #[must_use]
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            history: Vec::new(),
            request: request.into(),
        }
    }

    /// Attach history
    #[must_use]
    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }
}

/// Raw output of one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOutput {
    /// Agent name
    pub agent: String,
    /// Report key
    pub output_key: String,
    /// Final model text
    pub text: String,
    /// Tool rounds used
    pub tool_rounds: u32,
}

/// An agent bound to a model client and the tool registry
pub struct SpecialistAgent {
    definition: Arc<AgentDefinition>,
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    max_tool_rounds: u32,
}

impl SpecialistAgent {
    /// Bind a definition
    pub fn new(
        definition: Arc<AgentDefinition>,
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            definition,
            provider,
            tools,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    /// Set the tool round limit
    #[must_use]
    pub fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Definition this agent runs
    #[must_use]
    pub fn definition(&self) -> &AgentDefinition {
        &self.definition
    }

    /// Run the agent on `context`
    ///
    /// Tool calls are served from the registry, restricted to the tools the
    /// definition grants. The last round forbids tools so the model has to
    /// answer. Remote failures propagate unchanged.
    #[instrument(skip(self, context), fields(agent = %self.definition.name))]
    pub async fn invoke(&self, context: &AgentContext) -> Result<AgentOutput> {
        let def = &self.definition;
        let allowed: Vec<&str> = def.tools.iter().map(String::as_str).collect();
        let tool_defs = self.tools.definitions_for(allowed.as_slice());

        let mut messages = Vec::with_capacity(context.history.len() + 2);
        messages.push(Message::system(&def.instruction));
        messages.extend(context.history.iter().cloned());
        messages.push(Message::user(&context.request));

        let mut round = 0;
        loop {
            let final_round = round >= self.max_tool_rounds || tool_defs.is_empty();
            let request = CompletionRequest::new(&def.model.model_name)
                .with_messages(messages.clone())
                .with_retry(def.model.retry.clone());
            let request = ToolCompletionRequest::new(request, tool_defs.clone()).with_tool_choice(
                if final_round {
                    ToolChoice::None
                } else {
                    ToolChoice::Auto
                },
            );

            let response = self.provider.complete_with_tools(request).await?;

            if !response.has_tool_calls() || final_round {
                if response.has_tool_calls() {
                    warn!(round, "Model asked for tools on the final round; ignoring");
                }
                let text = response.content.unwrap_or_default();
                info!(rounds = round, chars = text.len(), "Agent finished");
                return Ok(AgentOutput {
                    agent: def.name.clone(),
                    output_key: def.output_key.clone(),
                    text,
                    tool_rounds: round,
                });
            }

            round += 1;
            debug!(round, calls = response.tool_calls.len(), "Executing tool calls");
            messages.push(Message::assistant_with_tool_calls(
                response.content.unwrap_or_default(),
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                let result = match self
                    .tools
                    .execute(&call.name, allowed.as_slice(), call.arguments_value())
                    .await
                {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(tool = %call.name, error = %e, "Tool call rejected");
                        ToolResult::failure(e.to_string(), 0)
                    }
                };
                messages.push(Message::tool_response(
                    &call.id,
                    &call.name,
                    result.to_model_content(),
                ));
            }
        }
    }
}
