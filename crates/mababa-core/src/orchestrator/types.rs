//! Orchestrator response types

use crate::artifacts::ConsultancyReport;
use crate::routing::RoutingDecision;
use serde::{Deserialize, Serialize};

/// Fixed reply to "what is your name"
pub const IDENTITY_RESPONSE: &str = "Hello! I am Agent MaBaba - Your Friendly Parental Consultant";

/// Reply when no intent matched
pub const FALLBACK_RESPONSE: &str = "I'm not sure how to help with that yet. I can:\n\
- build a shopping list for your newborn\n\
- build a shopping list for mom, during pregnancy and after\n\
- find parental education resources (classes, reading, support groups, experts, apps)\n\
- suggest coping strategies for pregnancy and the first year\n\
\n\
Could you tell me which of these you need?";

/// Result of one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultancyResponse {
    /// Rendered markdown shown to the user
    pub text: String,
    /// Structured report behind `text`
    pub report: ConsultancyReport,
    /// Routing decision the turn was served under
    pub decision: RoutingDecision,
}

impl ConsultancyResponse {
    /// Whether any invoked agent failed
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.report.failures().next().is_some()
    }
}
