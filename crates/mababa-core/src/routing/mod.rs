//! Intent routing
//!
//! A request maps to a set of [`Intent`]s; each non-identity intent selects
//! the agents registered for it. [`RuleClassifier`] is deterministic and
//! needs no network. [`ModelIntentClassifier`] asks the model and falls back
//! to the rules on any failure.

mod rules;

use crate::agents::ModelSettings;
use crate::artifacts::strip_code_fence;
use async_trait::async_trait;
use mababa_llm::{CompletionRequest, LlmProvider, Message};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Products for the newborn
    NewbornProducts,
    /// Products for the mother
    MotherProducts,
    /// Coping with pregnancy and postpartum challenges
    BehavioralSupport,
    /// Classes, reading and other learning resources
    ParentalEducation,
    /// "What is your name?"
    Identity,
}

impl Intent {
    /// All intents
    pub const ALL: [Intent; 5] = [
        Self::NewbornProducts,
        Self::MotherProducts,
        Self::BehavioralSupport,
        Self::ParentalEducation,
        Self::Identity,
    ];

    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewbornProducts => "newborn_products",
            Self::MotherProducts => "mother_products",
            Self::BehavioralSupport => "behavioral_support",
            Self::ParentalEducation => "parental_education",
            Self::Identity => "identity",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// Matched intents
    pub intents: BTreeSet<Intent>,
}

impl RoutingDecision {
    /// Decision from a set of intents
    pub fn new(intents: impl IntoIterator<Item = Intent>) -> Self {
        Self {
            intents: intents.into_iter().collect(),
        }
    }

    /// Nothing matched
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    /// Whether the identity question was asked
    #[must_use]
    pub fn wants_identity(&self) -> bool {
        self.intents.contains(&Intent::Identity)
    }

    /// Intents that need a specialist agent
    pub fn agent_intents(&self) -> impl Iterator<Item = Intent> + '_ {
        self.intents.iter().copied().filter(|i| *i != Intent::Identity)
    }
}

/// Maps a request to intents
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Classify `request`
    async fn classify(&self, request: &str) -> RoutingDecision;
}

/// Deterministic keyword classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleClassifier;

impl RuleClassifier {
    /// Classify without going through the async trait
    #[must_use]
    pub fn classify_sync(&self, request: &str) -> RoutingDecision {
        RoutingDecision {
            intents: rules::match_intents(request),
        }
    }
}

#[async_trait]
impl IntentClassifier for RuleClassifier {
    async fn classify(&self, request: &str) -> RoutingDecision {
        self.classify_sync(request)
    }
}

const CLASSIFIER_INSTRUCTION: &str = "You route requests for a parenting consultant. \
Reply with ONLY a JSON array of zero or more of these labels:\n\
- \"newborn_products\": the user wants to buy things for a baby\n\
- \"mother_products\": the user wants to buy things for the mother, during or after pregnancy\n\
- \"behavioral_support\": the user needs help coping with pregnancy or postpartum challenges\n\
- \"parental_education\": the user wants classes, books, groups, experts or apps\n\
- \"identity\": the user asks who you are or your name\n\
Return [] when none apply.";

/// Classifier that asks the model, falling back to the rules
pub struct ModelIntentClassifier {
    provider: Arc<dyn LlmProvider>,
    model: ModelSettings,
    fallback: RuleClassifier,
}

impl ModelIntentClassifier {
    /// Create a classifier using `model` on `provider`
    pub fn new(provider: Arc<dyn LlmProvider>, model: ModelSettings) -> Self {
        Self {
            provider,
            model,
            fallback: RuleClassifier,
        }
    }

    async fn ask_model(&self, request: &str) -> Result<BTreeSet<Intent>, String> {
        let completion = CompletionRequest::new(&self.model.model_name)
            .with_message(Message::system(CLASSIFIER_INSTRUCTION))
            .with_message(Message::user(request))
            .with_temperature(0.0)
            .with_retry(self.model.retry.clone());

        let response = self
            .provider
            .complete(completion)
            .await
            .map_err(|e| e.to_string())?;
        let labels: Vec<Intent> =
            serde_json::from_str(strip_code_fence(&response.content)).map_err(|e| e.to_string())?;
        Ok(labels.into_iter().collect())
    }
}

#[async_trait]
impl IntentClassifier for ModelIntentClassifier {
    async fn classify(&self, request: &str) -> RoutingDecision {
        match self.ask_model(request).await {
            Ok(intents) => {
                debug!(?intents, "Model routing decision");
                RoutingDecision { intents }
            }
            Err(e) => {
                warn!(error = %e, "Model routing failed; using keyword rules");
                self.fallback.classify_sync(request)
            }
        }
    }
}
