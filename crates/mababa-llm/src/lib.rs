//! MaBaba LLM - Remote model client abstraction
//!
//! This crate provides the model-call plumbing used by the MaBaba agents:
//! - Provider: the `LlmProvider` trait every remote model client implements
//! - Gemini: Google Gemini provider (generateContent over reqwest)
//! - Retry: fixed retry policy with exponential backoff on transient status codes
//! - Mock: scripted provider for tests and offline runs

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod error;
pub mod gemini;
pub mod message;
pub mod mock;
pub mod provider;
pub mod retry;
pub mod secret;
pub mod tools;
pub mod util;

pub use completion::{
    CompletionRequest, CompletionResponse, ToolCompletionRequest, ToolCompletionResponse,
};
pub use error::{Error, Result};
pub use gemini::{GeminiConfig, GeminiProvider};
pub use message::{Message, MessageRole};
pub use mock::{MockProvider, ScriptedReply};
pub use provider::LlmProvider;
pub use retry::{retry_with_backoff, RetryPolicy, Sleeper, TokioSleeper};
pub use secret::SecureString;
pub use tools::{ToolCall, ToolChoice, ToolDefinition};
