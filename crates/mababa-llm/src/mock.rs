//! Scripted provider for tests and offline runs
//!
//! Replies are queued per marker: a request is answered from the first queue
//! whose marker appears in the request's system instruction, falling back to
//! the unkeyed queue. Every request is recorded so callers can assert on what
//! was sent.

use crate::completion::{
    CompletionRequest, CompletionResponse, ToolCompletionRequest, ToolCompletionResponse,
};
use crate::error::{Error, Result};
use crate::provider::LlmProvider;
use crate::retry::RetryPolicy;
use crate::tools::{ToolCall, ToolChoice};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// A canned provider reply
#[derive(Debug)]
pub enum ScriptedReply {
    /// Plain text answer
    Text(String),
    /// Tool calls (name, JSON arguments)
    ToolCalls(Vec<(String, serde_json::Value)>),
    /// Error returned as-is
    Error(Error),
}

impl ScriptedReply {
    /// Text reply
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Single tool call reply
    #[must_use]
    pub fn tool_call(name: impl Into<String>, args: serde_json::Value) -> Self {
        Self::ToolCalls(vec![(name.into(), args)])
    }
}

/// What the mock saw for one call
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Model requested
    pub model: String,
    /// System instruction, if any
    pub system: Option<String>,
    /// Content of the last user message
    pub last_user: Option<String>,
    /// Tool names advertised (empty for plain completions)
    pub tools: Vec<String>,
    /// Tool choice (None for plain completions)
    pub tool_choice: Option<ToolChoice>,
    /// Retry policy carried by the request
    pub retry: Option<RetryPolicy>,
    /// Number of messages in the conversation
    pub message_count: usize,
}

/// Provider that answers from scripted queues
#[derive(Debug, Default)]
pub struct MockProvider {
    keyed: Mutex<Vec<(String, VecDeque<ScriptedReply>)>>,
    fallback: Mutex<VecDeque<ScriptedReply>>,
    recorded: Mutex<Vec<RecordedRequest>>,
    latency: Option<Duration>,
}

impl MockProvider {
    /// Create an empty mock
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for any request
    #[must_use]
    pub fn with_reply(self, reply: ScriptedReply) -> Self {
        if let Ok(mut queue) = self.fallback.lock() {
            queue.push_back(reply);
        }
        self
    }

    /// Queue a reply for requests whose system instruction contains `marker`
    #[must_use]
    pub fn with_reply_for(self, marker: impl Into<String>, reply: ScriptedReply) -> Self {
        let marker = marker.into();
        if let Ok(mut keyed) = self.keyed.lock() {
            match keyed.iter_mut().find(|(m, _)| *m == marker) {
                Some((_, queue)) => queue.push_back(reply),
                None => keyed.push((marker, VecDeque::from([reply]))),
            }
        }
        self
    }

    /// Delay every reply by `latency`
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Requests seen so far
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorded.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Number of calls made
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.recorded.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn record(&self, request: &CompletionRequest, tools: Vec<String>, choice: Option<ToolChoice>) {
        if let Ok(mut recorded) = self.recorded.lock() {
            recorded.push(RecordedRequest {
                model: request.model.clone(),
                system: request.system().map(str::to_string),
                last_user: request.last_user().map(str::to_string),
                tools,
                tool_choice: choice,
                retry: request.retry.clone(),
                message_count: request.messages.len(),
            });
        }
    }

    fn next_reply(&self, request: &CompletionRequest) -> Result<ScriptedReply> {
        let system = request.system().unwrap_or_default();

        if let Ok(mut keyed) = self.keyed.lock() {
            for (marker, queue) in keyed.iter_mut() {
                if system.contains(marker.as_str()) {
                    if let Some(reply) = queue.pop_front() {
                        return Ok(reply);
                    }
                }
            }
        }

        self.fallback
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .ok_or_else(|| Error::InvalidResponse("no scripted reply left".to_string()))
    }

    async fn answer(&self, request: &CompletionRequest) -> Result<ToolCompletionResponse> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.next_reply(request)? {
            ScriptedReply::Text(text) => Ok(ToolCompletionResponse {
                content: Some(text),
                tool_calls: Vec::new(),
            }),
            ScriptedReply::ToolCalls(calls) => Ok(ToolCompletionResponse {
                content: None,
                tool_calls: calls
                    .into_iter()
                    .enumerate()
                    .map(|(i, (name, args))| ToolCall {
                        id: format!("call_{i}"),
                        name,
                        arguments: args.to_string(),
                    })
                    .collect(),
            }),
            ScriptedReply::Error(e) => Err(e),
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn default_model(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.record(&request, Vec::new(), None);
        let response = self.answer(&request).await?;
        if response.has_tool_calls() {
            return Err(Error::InvalidResponse(
                "tool call returned for a plain completion".to_string(),
            ));
        }
        Ok(CompletionResponse {
            content: response.content.unwrap_or_default(),
        })
    }

    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest,
    ) -> Result<ToolCompletionResponse> {
        let tools = request.tools.iter().map(|t| t.name.clone()).collect();
        self.record(&request.request, tools, Some(request.tool_choice.clone()));
        self.answer(&request.request).await
    }
}
