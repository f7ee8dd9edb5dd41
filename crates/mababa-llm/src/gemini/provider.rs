//! Gemini provider implementation

use super::config::GeminiConfig;
use super::convert::{
    convert_messages, convert_tool_choice, convert_tools, split_candidate,
};
use super::types::*;
use crate::completion::{
    CompletionRequest, CompletionResponse, ToolCompletionRequest, ToolCompletionResponse,
};
use crate::error::{Error, Result};
use crate::provider::LlmProvider;
use crate::retry::{retry_with_backoff, RetryPolicy, Sleeper, TokioSleeper};
use crate::util::sanitize_api_error;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Google Gemini provider
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(config: GeminiConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            client,
            config,
            sleeper: Arc::new(TokioSleeper),
        })
    }

    /// Replace the sleeper used between retries
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn resolve_model<'a>(&'a self, requested: &'a str) -> &'a str {
        if requested.is_empty() {
            &self.config.default_model
        } else {
            requested
        }
    }

    /// Send a request under the retry policy
    async fn send_request(
        &self,
        model: &str,
        retry: Option<&RetryPolicy>,
        request: &GeminiRequest,
    ) -> Result<GeminiResponse> {
        let policy = retry.unwrap_or(&self.config.retry);
        retry_with_backoff(policy, self.sleeper.as_ref(), |attempt| {
            debug!(model, attempt, "Sending request to Gemini");
            self.send_request_once(model, request)
        })
        .await
    }

    async fn send_request_once(&self, model: &str, request: &GeminiRequest) -> Result<GeminiResponse> {
        let api_key = self.config.api_key.as_ref().ok_or_else(|| {
            Error::NotConfigured("no Gemini API key (set GOOGLE_API_KEY)".to_string())
        })?;

        // SECURITY: the URL carries the key and is never logged
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url,
            model,
            api_key.expose()
        );

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(self.config.timeout.as_millis() as u64)
                } else {
                    // reqwest errors may echo the URL
                    Error::Network(sanitize_api_error(&e.without_url().to_string()))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.without_url().to_string()))?;

        if !status.is_success() {
            warn!(status = %status, "Gemini API error response");
            let message = match serde_json::from_str::<GeminiError>(&body) {
                Ok(err) => format!("{}: {}", err.error.status, err.error.message),
                Err(_) => format!("HTTP {}", status),
            };
            return Err(Error::Http {
                status: status.as_u16(),
                message: sanitize_api_error(&message),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::InvalidResponse(e.to_string()))
    }

    fn generation_config(&self, request: &CompletionRequest) -> GenerationConfig {
        GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: Some(self.config.default_max_tokens),
        }
    }
}

fn log_usage(response: &GeminiResponse, candidate: &Candidate) {
    if let Some(usage) = &response.usage_metadata {
        debug!(
            prompt_tokens = usage.prompt_token_count,
            completion_tokens = usage.candidates_token_count.unwrap_or(0),
            total_tokens = usage.total_token_count,
            finish_reason = candidate.finish_reason.as_deref().unwrap_or("unknown"),
            "Gemini usage"
        );
    }
}

#[async_trait::async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let model = self.resolve_model(&request.model);
        let (system_instruction, contents) = convert_messages(&request.messages);
        let gemini_request = GeminiRequest {
            contents,
            system_instruction,
            generation_config: Some(self.generation_config(&request)),
            tools: None,
            tool_config: None,
        };

        let response = self
            .send_request(model, request.retry.as_ref(), &gemini_request)
            .await?;
        let candidate = response
            .candidates
            .first()
            .ok_or_else(|| Error::InvalidResponse("No candidates in response".to_string()))?;
        log_usage(&response, candidate);
        let (content, _) = split_candidate(candidate);

        Ok(CompletionResponse { content })
    }

    #[instrument(skip(self, request), fields(model = %request.request.model, tools = request.tools.len()))]
    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest,
    ) -> Result<ToolCompletionResponse> {
        let model = self.resolve_model(&request.request.model);
        let (system_instruction, contents) = convert_messages(&request.request.messages);
        let (tools, tool_config) = if request.tools.is_empty() {
            (None, None)
        } else {
            (
                Some(convert_tools(&request.tools)),
                Some(convert_tool_choice(&request.tool_choice)),
            )
        };
        let gemini_request = GeminiRequest {
            contents,
            system_instruction,
            generation_config: Some(self.generation_config(&request.request)),
            tools,
            tool_config,
        };

        let response = self
            .send_request(model, request.request.retry.as_ref(), &gemini_request)
            .await?;
        let candidate = response
            .candidates
            .first()
            .ok_or_else(|| Error::InvalidResponse("No candidates in response".to_string()))?;
        log_usage(&response, candidate);
        let (text, tool_calls) = split_candidate(candidate);

        Ok(ToolCompletionResponse {
            content: (!text.is_empty()).then_some(text),
            tool_calls,
        })
    }
}
