//! Orchestrator core structure
//!
//! Contains the `Orchestrator` struct and its builder methods.

use crate::agents::{AgentCatalog, OutputHook, PassThrough};
use crate::error::Result;
use crate::routing::{IntentClassifier, ModelIntentClassifier, RoutingDecision, RuleClassifier};
use mababa_llm::LlmProvider;
use mababa_tools::ToolRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::config::{OrchestratorConfig, RoutingMode};

/// Routes requests to specialist agents and assembles their report
pub struct Orchestrator {
    pub(crate) catalog: AgentCatalog,
    pub(crate) provider: Arc<dyn LlmProvider>,
    pub(crate) tools: Arc<ToolRegistry>,
    pub(crate) classifier: Arc<dyn IntentClassifier>,
    pub(crate) hooks: HashMap<String, Arc<dyn OutputHook>>,
    pub(crate) default_hook: Arc<dyn OutputHook>,
    pub(crate) config: OrchestratorConfig,
    /// Parent of every turn's token; cancelling it aborts all in-flight turns
    pub(crate) shutdown: CancellationToken,
}

impl Orchestrator {
    /// Create an orchestrator; the classifier follows `config.routing`
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        catalog: AgentCatalog,
        config: OrchestratorConfig,
    ) -> Result<Self> {
        config.validate()?;

        let classifier: Arc<dyn IntentClassifier> = match config.routing {
            RoutingMode::Rules => Arc::new(RuleClassifier),
            RoutingMode::Model => {
                let model = catalog
                    .iter()
                    .next()
                    .map(|def| def.model.clone())
                    .unwrap_or_default();
                Arc::new(ModelIntentClassifier::new(provider.clone(), model))
            }
        };

        info!(
            agents = catalog.len(),
            routing = ?config.routing,
            validation = ?config.validation,
            timeout_secs = config.agent_timeout_secs,
            "Orchestrator ready"
        );

        Ok(Self {
            catalog,
            provider,
            tools,
            classifier,
            hooks: HashMap::new(),
            default_hook: Arc::new(PassThrough),
            config,
            shutdown: CancellationToken::new(),
        })
    }

    /// Replace the intent classifier
    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Install a hook for one agent, by name
    #[must_use]
    pub fn with_hook(mut self, agent: impl Into<String>, hook: Arc<dyn OutputHook>) -> Self {
        self.hooks.insert(agent.into(), hook);
        self
    }

    /// Hook for every agent without its own
    #[must_use]
    pub fn with_default_hook(mut self, hook: Arc<dyn OutputHook>) -> Self {
        self.default_hook = hook;
        self
    }

    /// The agent catalog
    #[must_use]
    pub fn catalog(&self) -> &AgentCatalog {
        &self.catalog
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Token whose cancellation aborts every in-flight turn
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Classify a request without invoking anything
    pub async fn route(&self, request: &str) -> RoutingDecision {
        self.classifier.classify(request).await
    }

    pub(crate) fn hook_for(&self, agent: &str) -> &Arc<dyn OutputHook> {
        self.hooks.get(agent).unwrap_or(&self.default_hook)
    }
}
