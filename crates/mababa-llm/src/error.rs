//! Error types for mababa-llm

use thiserror::Error;

/// LLM error type
#[derive(Debug, Error)]
pub enum Error {
    /// Provider not configured (missing credential, bad base URL)
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// Invalid client configuration (retry policy, timeouts)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP error status returned by the model endpoint
    #[error("http {status}: {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Sanitized error message
        message: String,
    },

    /// Retry budget exhausted on a retryable status
    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Total attempts made
        attempts: u32,
        /// The last error observed
        last: Box<Error>,
    },

    /// Invalid response
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),
}

impl Error {
    /// HTTP status carried by this error, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::RetriesExhausted { last, .. } => last.status(),
            _ => None,
        }
    }

    /// Whether this error is final for the caller (retry budget spent or
    /// the failure was never retryable)
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. })
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
