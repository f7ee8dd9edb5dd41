//! Agent definition types

use crate::routing::Intent;
use mababa_llm::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Model used by an agent and the retry policy its calls run under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Model identifier
    pub model_name: String,
    /// Retry policy handed to the model client
    pub retry: RetryPolicy,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model_name: mababa_llm::gemini::DEFAULT_MODEL.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Shape of the artifact an agent must produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactShape {
    /// JSON array of product records, rendered as one table per category
    ProductTable {
        /// Categories in display order
        categories: Vec<String>,
    },
    /// Free markdown arranged under the given sections
    Markdown {
        /// Expected section headings
        sections: Vec<String>,
    },
}

impl ArtifactShape {
    /// Product table shape
    pub fn products<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ProductTable {
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    /// Markdown shape
    pub fn markdown<I, S>(sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Markdown {
            sections: sections.into_iter().map(Into::into).collect(),
        }
    }

    /// Category or section names
    #[must_use]
    pub fn labels(&self) -> &[String] {
        match self {
            Self::ProductTable { categories } => categories,
            Self::Markdown { sections } => sections,
        }
    }
}

/// A specialist agent definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDefinition {
    /// Unique agent name
    pub name: String,
    /// Section title used in the report
    pub title: String,
    /// One-line description
    pub description: String,
    /// System instruction sent with every call
    pub instruction: String,
    /// Unique report key the agent's artifact is stored under
    pub output_key: String,
    /// Tools the agent may call
    pub tools: BTreeSet<String>,
    /// Model and retry settings
    pub model: ModelSettings,
    /// Artifact shape
    pub shape: ArtifactShape,
    /// Intent that selects this agent
    pub intent: Intent,
}

impl AgentDefinition {
    /// Create a definition with no tools, default model settings and an
    /// empty instruction
    pub fn new(
        name: impl Into<String>,
        output_key: impl Into<String>,
        intent: Intent,
        shape: ArtifactShape,
    ) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            description: String::new(),
            instruction: String::new(),
            output_key: output_key.into(),
            tools: BTreeSet::new(),
            model: ModelSettings::default(),
            shape,
            intent,
        }
    }

    /// Set the report title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the system instruction
    #[must_use]
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    /// Grant a tool
    #[must_use]
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tools.insert(tool.into());
        self
    }

    /// Set model settings
    #[must_use]
    pub fn with_model(mut self, model: ModelSettings) -> Self {
        self.model = model;
        self
    }

    /// Whether the agent produces product records
    #[must_use]
    pub fn produces_products(&self) -> bool {
        matches!(self.shape, ArtifactShape::ProductTable { .. })
    }
}
