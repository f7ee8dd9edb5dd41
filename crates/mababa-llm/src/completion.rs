//! What an agent sends to a model and what it gets back

use crate::message::{Message, MessageRole};
use crate::retry::RetryPolicy;
use crate::tools::{ToolCall, ToolChoice, ToolDefinition};

/// One model call
///
/// The caller picks the model and the retry policy; the provider fills in
/// anything left unset from its own configuration.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// Model name (empty = provider default)
    pub model: String,
    /// Conversation, system instruction first
    pub messages: Vec<Message>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Retry policy (None = provider default)
    pub retry: Option<RetryPolicy>,
}

impl CompletionRequest {
    /// Request for `model`
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Append a message
    #[must_use]
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Append messages in order
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Set the temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// The system instruction, if the conversation carries one
    #[must_use]
    pub fn system(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
    }

    /// The most recent user message
    #[must_use]
    pub fn last_user(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }
}

/// Text-only reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionResponse {
    /// Generated text
    pub content: String,
}

/// A model call that may answer with tool calls
#[derive(Debug, Clone)]
pub struct ToolCompletionRequest {
    /// Underlying request
    pub request: CompletionRequest,
    /// Tools the model may call; only the calling agent's own
    pub tools: Vec<ToolDefinition>,
    /// Tool calling mode
    pub tool_choice: ToolChoice,
}

impl ToolCompletionRequest {
    /// Tools offered with [`ToolChoice::Auto`]
    #[must_use]
    pub fn new(request: CompletionRequest, tools: Vec<ToolDefinition>) -> Self {
        Self {
            request,
            tools,
            tool_choice: ToolChoice::Auto,
        }
    }

    /// Set the tool choice
    #[must_use]
    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = choice;
        self
    }
}

/// Reply to a [`ToolCompletionRequest`]: text, tool calls, or both
#[derive(Debug, Clone, Default)]
pub struct ToolCompletionResponse {
    /// Text, if the model wrote any
    pub content: Option<String>,
    /// Calls the model wants made
    pub tool_calls: Vec<ToolCall>,
}

impl ToolCompletionResponse {
    /// Whether any tool call was requested
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}
