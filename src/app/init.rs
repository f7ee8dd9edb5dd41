//! Application initialization
//!
//! Resolves the API key once, then builds the Gemini provider, the tool
//! registry, the agent catalog and the orchestrator.

use super::config::AppConfig;
use anyhow::{Context, Result};
use mababa_core::credentials::API_KEY_VARS;
use mababa_core::{resolve_api_key, AgentCatalog, EnvSecretSource, Orchestrator, Runner};
use mababa_llm::GeminiProvider;
use mababa_tools::{register_builtins, ToolRegistry};
use std::sync::Arc;
use tracing::info;

/// Wired-up application
pub struct App {
    pub config: AppConfig,
    pub orchestrator: Arc<Orchestrator>,
}

impl App {
    /// Runner for a chat session
    pub fn runner(&self) -> Runner {
        Runner::new(self.orchestrator.clone()).with_history_turns(self.config.chat.history_turns)
    }
}

/// Built-in catalog with the configured model and product policy
pub fn build_catalog(config: &AppConfig) -> Result<AgentCatalog> {
    AgentCatalog::builtin(&config.llm.model_settings(), &config.orchestrator.products)
        .context("Failed to build agent catalog")
}

/// Build everything a turn needs
///
/// A missing API key is not an error here; each model call then fails with
/// a credential error in its own report section.
pub fn build_app(config: AppConfig) -> Result<App> {
    config.validate()?;

    let api_key = resolve_api_key(&EnvSecretSource, &API_KEY_VARS);
    let provider = GeminiProvider::new(config.llm.gemini_config(api_key))
        .context("Failed to create Gemini provider")?;

    let mut registry = ToolRegistry::new();
    register_builtins(&mut registry, &config.search);
    info!(tools = ?registry.list_names(), "Tools registered");

    let catalog = build_catalog(&config)?;
    let orchestrator = Orchestrator::new(
        Arc::new(provider),
        Arc::new(registry),
        catalog,
        config.orchestrator.clone(),
    )
    .context("Failed to create orchestrator")?;

    Ok(App {
        config,
        orchestrator: Arc::new(orchestrator),
    })
}
