//! Error types for mababa-core
//!
//! Every failure maps onto an [`ErrorKind`]; per-section failures in a report
//! carry the kind so callers can tell a missing credential from a flaky
//! endpoint without parsing messages.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failure taxonomy shared by the report and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// API key missing or rejected
    Credential,
    /// Retryable remote failure (retry budget spent)
    TransientRemote,
    /// Remote failure that retrying cannot fix
    TerminalRemote,
    /// Agent output did not match its artifact shape or business rules
    SchemaViolation,
    /// Wall-clock limit exceeded
    Timeout,
    /// Turn cancelled by the caller
    Cancelled,
    /// Invalid settings
    Configuration,
    /// Anything else
    Internal,
}

impl ErrorKind {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credential => "credential",
            Self::TransientRemote => "transient_remote",
            Self::TerminalRemote => "terminal_remote",
            Self::SchemaViolation => "schema_violation",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::Configuration => "configuration",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// API key missing or rejected
    #[error("credential error: {0}")]
    Credential(String),

    /// LLM provider error
    #[error("llm error: {0}")]
    Llm(#[from] mababa_llm::Error),

    /// Tool error
    #[error("tool error: {0}")]
    Tool(#[from] mababa_tools::Error),

    /// Agent output rejected
    #[error("schema violation in {output_key}: {message}")]
    SchemaViolation {
        /// Section the output was meant for
        output_key: String,
        /// What was wrong
        message: String,
    },

    /// Agent exceeded its wall-clock budget
    #[error("agent {agent} timed out after {secs}s")]
    Timeout {
        /// Agent name
        agent: String,
        /// Budget in seconds
        secs: u64,
    },

    /// Turn cancelled
    #[error("cancelled")]
    Cancelled,

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Classify the error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        use mababa_llm::Error as Llm;

        match self {
            Self::Credential(_) => ErrorKind::Credential,
            Self::Llm(e) => match e {
                Llm::NotConfigured(_) => ErrorKind::Credential,
                Llm::InvalidConfig(_) => ErrorKind::Configuration,
                Llm::Http { status: 401 | 403, .. } => ErrorKind::Credential,
                Llm::Http { .. } | Llm::InvalidResponse(_) => ErrorKind::TerminalRemote,
                Llm::RetriesExhausted { .. } | Llm::Network(_) => ErrorKind::TransientRemote,
                Llm::Timeout(_) => ErrorKind::Timeout,
            },
            Self::Tool(mababa_tools::Error::Timeout(_)) => ErrorKind::Timeout,
            Self::Tool(_) => ErrorKind::Internal,
            Self::SchemaViolation { .. } => ErrorKind::SchemaViolation,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn schema(output_key: &str, message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            output_key: output_key.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for user-friendly error messages
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get a suggestion for how to fix the error
    fn suggestion(&self) -> Option<String>;

    /// Get a documentation URL for more information
    fn docs_url(&self) -> Option<&str>;
}

impl UserFriendlyError for Error {
    fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Credential => "🔑 Gemini API key is missing or was rejected.".to_string(),
            ErrorKind::TransientRemote => {
                "⏳ The model service is busy and did not recover after several retries.".to_string()
            }
            ErrorKind::TerminalRemote => format!("🤖 The model service refused the request: {}", self),
            ErrorKind::SchemaViolation => format!("📋 A specialist returned unusable output: {}", self),
            ErrorKind::Timeout => format!("⏱️ {}", self),
            ErrorKind::Cancelled => "✋ Request cancelled.".to_string(),
            ErrorKind::Configuration => format!("⚙️ {}", self),
            ErrorKind::Internal => format!("❌ Internal error: {}", self),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self.kind() {
            ErrorKind::Credential => Some(
                "💡 Set the GOOGLE_API_KEY (or GEMINI_API_KEY) environment variable or add it to .env."
                    .to_string(),
            ),
            ErrorKind::TransientRemote => {
                Some("💡 Wait a minute and ask again, or narrow the request.".to_string())
            }
            ErrorKind::Timeout => Some(
                "💡 Raise orchestrator.agent_timeout_secs or ask for fewer things at once.".to_string(),
            ),
            ErrorKind::Configuration => {
                Some("💡 Check config/default.toml, config/local.toml and MABABA_* variables.".to_string())
            }
            ErrorKind::SchemaViolation => Some(
                "💡 Ask again; setting orchestrator.validation = \"filter\" keeps the valid records."
                    .to_string(),
            ),
            _ => None,
        }
    }

    fn docs_url(&self) -> Option<&str> {
        match self.kind() {
            ErrorKind::Credential => Some("https://ai.google.dev/gemini-api/docs/api-key"),
            ErrorKind::TransientRemote => Some("https://ai.google.dev/gemini-api/docs/troubleshooting"),
            _ => None,
        }
    }
}

/// Format an error for display in the CLI
pub fn format_error_for_cli(error: &Error) -> String {
    let mut output = error.user_message();
    output.push_str("\n\n");

    if let Some(suggestion) = error.suggestion() {
        output.push_str(&suggestion);
        output.push_str("\n\n");
    }

    if let Some(url) = error.docs_url() {
        output.push_str(&format!("📚 More info: {}\n", url));
    }

    output
}

/// Format an error for display inline in a chat reply
pub fn format_error_for_chat(error: &Error) -> String {
    let mut output = error.user_message();

    if let Some(suggestion) = error.suggestion() {
        output.push_str("\n\n");
        output.push_str(&suggestion);
    }

    output
}
