//! Gemini provider configuration

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use crate::secret::SecureString;
use crate::util::mask_api_key;
use std::fmt;
use std::time::Duration;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used by every MaBaba agent
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

/// Gemini provider configuration
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key; `None` makes every call fail with a credential error
    pub api_key: Option<SecureString>,
    /// Base URL up to and including the API version
    pub base_url: String,
    /// Model used when a request leaves it empty
    pub default_model: String,
    /// Default max output tokens
    pub default_max_tokens: u32,
    /// Per-attempt HTTP timeout
    pub timeout: Duration,
    /// Retry policy used when a request carries none
    pub retry: RetryPolicy,
}

// SECURITY: Custom Debug implementation to mask credentials
impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked = self
            .api_key
            .as_ref()
            .map_or_else(|| "None".to_string(), |k| mask_api_key(k.expose()));
        f.debug_struct("GeminiConfig")
            .field("api_key", &masked)
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            default_max_tokens: 8192,
            timeout: Duration::from_secs(120),
            retry: RetryPolicy::default(),
        }
    }
}

impl GeminiConfig {
    /// Create a configuration with an API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(SecureString::new(api_key)),
            ..Self::default()
        }
    }

    /// Set or clear the API key
    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<SecureString>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the default model
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set the per-attempt timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the default retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Check the configuration before building a client
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::InvalidConfig("gemini base_url is empty".to_string()));
        }
        if self.default_model.is_empty() {
            return Err(Error::InvalidConfig("gemini model is empty".to_string()));
        }
        self.retry.validate()
    }
}
