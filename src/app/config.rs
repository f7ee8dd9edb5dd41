//! Application configuration types

use anyhow::{bail, Context, Result};
use mababa_core::{ModelSettings, OrchestratorConfig};
use mababa_llm::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use mababa_llm::{GeminiConfig, RetryPolicy, SecureString};
use mababa_tools::SearchConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl AppConfig {
    /// Check settings that would otherwise fail later, one call at a time
    pub fn validate(&self) -> Result<()> {
        self.llm
            .retry
            .validate()
            .context("Invalid [llm.retry] settings")?;
        if self.llm.timeout_secs == 0 {
            bail!("llm.timeout_secs must be positive");
        }
        if self.llm.model.trim().is_empty() {
            bail!("llm.model must not be empty");
        }
        self.orchestrator
            .validate()
            .context("Invalid [orchestrator] settings")?;
        if self.search.enabled && self.search.timeout_secs == 0 {
            bail!("search.timeout_secs must be positive");
        }
        Ok(())
    }
}

/// Gemini settings (`[llm]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-attempt HTTP timeout
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_llm_timeout_secs() -> u64 {
    120
}
fn default_max_tokens() -> u32 {
    8192
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_llm_timeout_secs(),
            max_tokens: default_max_tokens(),
            retry: RetryPolicy::default(),
        }
    }
}

impl LlmConfig {
    /// Model settings shared by every agent
    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings {
            model_name: self.model.clone(),
            retry: self.retry.clone(),
        }
    }

    /// Provider configuration carrying `api_key`
    pub fn gemini_config(&self, api_key: Option<SecureString>) -> GeminiConfig {
        let mut config = GeminiConfig::default()
            .with_api_key(api_key)
            .with_base_url(&self.base_url)
            .with_default_model(&self.model)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_retry(self.retry.clone());
        config.default_max_tokens = self.max_tokens;
        config
    }
}

/// REPL settings (`[chat]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Earlier turns handed to agents as history
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,
}

fn default_history_turns() -> usize {
    mababa_core::runner::DEFAULT_HISTORY_TURNS
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_turns: default_history_turns(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.llm.model, "gemini-2.5-flash-lite");
        assert_eq!(config.chat.history_turns, 5);
    }

    #[test]
    fn test_bad_retry_policy_rejected() {
        let mut config = AppConfig::default();
        config.llm.retry.max_attempts = 0;
        let err = config.validate().unwrap_err();
        assert!(format!("{err:#}").contains("max_attempts"));
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let mut config = AppConfig::default();
        config.llm.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.orchestrator.agent_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_gemini_config_from_llm_section() {
        let llm = LlmConfig {
            base_url: "http://127.0.0.1:9999/v1beta/".to_string(),
            max_tokens: 1024,
            ..LlmConfig::default()
        };
        let gemini = llm.gemini_config(None);
        assert!(gemini.api_key.is_none());
        assert_eq!(gemini.base_url, "http://127.0.0.1:9999/v1beta");
        assert_eq!(gemini.default_max_tokens, 1024);
        assert_eq!(gemini.timeout, Duration::from_secs(120));
    }
}
