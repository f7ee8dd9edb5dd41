//! Orchestrator configuration

use crate::agents::DEFAULT_MAX_TOOL_ROUNDS;
use crate::artifacts::ProductPolicy;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// How requests are mapped to intents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingMode {
    /// Deterministic keyword rules
    #[default]
    Rules,
    /// Ask the model, falling back to the rules
    Model,
}

/// What happens to product records that break the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Any violation fails the whole section
    #[default]
    Strict,
    /// Violating records are dropped; the section fails only if none remain
    Filter,
}

/// Configuration for the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Wall-clock budget per agent invocation, in seconds
    pub agent_timeout_secs: u64,
    /// Tool-calling rounds before an agent must answer
    pub max_tool_rounds: u32,
    /// Intent classifier
    pub routing: RoutingMode,
    /// Product record validation
    pub validation: ValidationMode,
    /// Product business rules
    pub products: ProductPolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            agent_timeout_secs: 600,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            routing: RoutingMode::default(),
            validation: ValidationMode::default(),
            products: ProductPolicy::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Create a new configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-agent timeout
    #[must_use]
    pub fn with_agent_timeout_secs(mut self, secs: u64) -> Self {
        self.agent_timeout_secs = secs;
        self
    }

    /// Set the tool round limit
    #[must_use]
    pub fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Set the routing mode
    #[must_use]
    pub fn with_routing(mut self, routing: RoutingMode) -> Self {
        self.routing = routing;
        self
    }

    /// Set the validation mode
    #[must_use]
    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }

    /// Set the product policy
    #[must_use]
    pub fn with_products(mut self, products: ProductPolicy) -> Self {
        self.products = products;
        self
    }

    /// Check settings
    pub fn validate(&self) -> Result<()> {
        if self.agent_timeout_secs == 0 {
            return Err(Error::Configuration(
                "orchestrator.agent_timeout_secs must be positive".to_string(),
            ));
        }
        self.products.validate()
    }
}
