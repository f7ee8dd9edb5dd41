//! Consultancy report assembled from specialist outcomes

use super::Artifact;
use crate::error::ErrorKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What became of one specialist's section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SectionOutcome {
    /// Parsed and validated artifact
    Artifact {
        /// The artifact
        artifact: Artifact,
    },
    /// An output hook withheld the section
    Suppressed,
    /// The agent failed
    Failed {
        /// Failure class
        kind: ErrorKind,
        /// Human-readable message
        message: String,
    },
}

/// One section of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    /// Output key of the agent that produced it
    pub output_key: String,
    /// Agent name
    pub agent: String,
    /// Section heading
    pub title: String,
    /// Outcome
    #[serde(flatten)]
    pub outcome: SectionOutcome,
}

/// Report for one user turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultancyReport {
    /// Identity line, when the user asked who we are
    pub greeting: Option<String>,
    /// Sections in catalog order, one per invoked agent
    pub sections: Vec<ReportSection>,
    /// When the report was assembled
    pub generated_at: DateTime<Utc>,
}

impl Default for ConsultancyReport {
    fn default() -> Self {
        Self {
            greeting: None,
            sections: Vec::new(),
            generated_at: Utc::now(),
        }
    }
}

impl ConsultancyReport {
    /// Empty report stamped now
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Section for `output_key`
    #[must_use]
    pub fn section(&self, output_key: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.output_key == output_key)
    }

    /// Outcome for `output_key`
    #[must_use]
    pub fn outcome(&self, output_key: &str) -> Option<&SectionOutcome> {
        self.section(output_key).map(|s| &s.outcome)
    }

    /// Sections whose agent failed
    pub fn failures(&self) -> impl Iterator<Item = &ReportSection> {
        self.sections
            .iter()
            .filter(|s| matches!(s.outcome, SectionOutcome::Failed { .. }))
    }

    /// No greeting and no sections
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.greeting.is_none() && self.sections.is_empty()
    }

    /// Markdown rendering of the whole report
    #[must_use]
    pub fn render(&self) -> String {
        let mut parts = Vec::with_capacity(self.sections.len() + 1);
        if let Some(greeting) = &self.greeting {
            parts.push(greeting.clone());
        }
        for section in &self.sections {
            let body = match &section.outcome {
                SectionOutcome::Artifact { artifact } => artifact.render().trim_end().to_string(),
                SectionOutcome::Suppressed => "_This section was withheld._".to_string(),
                SectionOutcome::Failed { kind, message } => {
                    format!("> ⚠️ This section could not be prepared ({kind}): {message}")
                }
            };
            parts.push(format!("## {}\n\n{}", section.title, body));
        }
        parts.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::MarkdownDocument;

    fn section(key: &str, title: &str, outcome: SectionOutcome) -> ReportSection {
        ReportSection {
            output_key: key.to_string(),
            agent: format!("{key}_agent"),
            title: title.to_string(),
            outcome,
        }
    }

    fn report() -> ConsultancyReport {
        let doc = MarkdownDocument::parse("behavioral_support_strategy", "### After Pregnancy\nSleep in shifts.\n")
            .unwrap();
        ConsultancyReport {
            greeting: None,
            sections: vec![
                section(
                    "newborn_products",
                    "Newborn Shopping List",
                    SectionOutcome::Failed {
                        kind: ErrorKind::TransientRemote,
                        message: "service busy".into(),
                    },
                ),
                section(
                    "behavioral_support_strategy",
                    "Coping Strategies",
                    SectionOutcome::Artifact {
                        artifact: Artifact::Document(doc),
                    },
                ),
                section("parental_education", "Parental Education Resources", SectionOutcome::Suppressed),
            ],
            ..ConsultancyReport::default()
        }
    }

    #[test]
    fn test_render_sections_in_order() {
        let rendered = report().render();
        assert_eq!(
            rendered,
            "## Newborn Shopping List\n\n\
             > ⚠️ This section could not be prepared (transient_remote): service busy\n\n\
             ## Coping Strategies\n\n\
             ### After Pregnancy\nSleep in shifts.\n\n\
             ## Parental Education Resources\n\n\
             _This section was withheld._"
        );
    }

    #[test]
    fn test_lookup_and_failures() {
        let report = report();
        assert!(matches!(
            report.outcome("parental_education"),
            Some(SectionOutcome::Suppressed)
        ));
        assert_eq!(report.failures().count(), 1);
        assert!(report.outcome("newmom_products").is_none());
        assert!(!report.is_empty());
        assert!(ConsultancyReport::new().is_empty());
    }

    #[test]
    fn test_serializes_status_inline() {
        let json = serde_json::to_value(report()).unwrap();
        let sections = json["sections"].as_array().unwrap();
        assert_eq!(sections[0]["status"], "failed");
        assert_eq!(sections[0]["kind"], "transient_remote");
        assert_eq!(sections[1]["status"], "artifact");
        assert_eq!(sections[1]["artifact"]["type"], "document");
        assert_eq!(sections[2]["status"], "suppressed");
    }
}
