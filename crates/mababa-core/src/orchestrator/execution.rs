//! Per-turn execution
//!
//! Selected agents run concurrently, each under its own timeout. A failure
//! lands in that agent's section only; the other sections are still built.

use crate::agents::{AgentContext, AgentDefinition, ArtifactShape, HookOutcome, SpecialistAgent};
use crate::artifacts::{
    Artifact, ConsultancyReport, MarkdownDocument, ProductCollection, ReportSection,
    SectionOutcome,
};
use crate::error::{Error, Result};
use futures::future::join_all;
use mababa_llm::Message;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::config::ValidationMode;
use super::core::Orchestrator;
use super::types::{ConsultancyResponse, FALLBACK_RESPONSE, IDENTITY_RESPONSE};

impl Orchestrator {
    /// Answer one request
    ///
    /// `history` holds earlier turns and is handed to every invoked agent.
    pub async fn respond(&self, request: &str, history: &[Message]) -> Result<ConsultancyResponse> {
        let token = self.shutdown.child_token();
        self.respond_with_cancel(request, history, &token).await
    }

    /// Answer one request, aborting when `cancel` fires
    ///
    /// Cancellation drops every in-flight agent call and returns
    /// [`Error::Cancelled`]; no partial report is produced.
    #[instrument(skip(self, history, cancel), fields(turn_id = %Uuid::new_v4()))]
    pub async fn respond_with_cancel(
        &self,
        request: &str,
        history: &[Message],
        cancel: &CancellationToken,
    ) -> Result<ConsultancyResponse> {
        let start = Instant::now();
        let decision = self.classifier.classify(request).await;
        info!(intents = ?decision.intents, "Routing decision");

        let mut report = ConsultancyReport::new();
        if decision.wants_identity() {
            report.greeting = Some(IDENTITY_RESPONSE.to_string());
        }

        let selected: Vec<Arc<AgentDefinition>> = self
            .catalog
            .iter()
            .filter(|def| decision.intents.contains(&def.intent))
            .cloned()
            .collect();

        if !selected.is_empty() {
            let context = AgentContext::new(request).with_history(history.to_vec());
            let futures = selected.iter().map(|def| self.run_section(def.clone(), &context));

            let sections = tokio::select! {
                sections = join_all(futures) => sections,
                _ = cancel.cancelled() => {
                    warn!(agents = selected.len(), "Turn cancelled");
                    return Err(Error::Cancelled);
                }
            };
            report.sections = sections;
        }

        let text = if report.is_empty() {
            debug!("No intent matched; asking for clarification");
            FALLBACK_RESPONSE.to_string()
        } else {
            report.render()
        };

        info!(
            sections = report.sections.len(),
            failed = report.failures().count(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Turn completed"
        );

        Ok(ConsultancyResponse {
            text,
            report,
            decision,
        })
    }

    /// Invoke one agent and turn whatever happens into its report section
    async fn run_section(&self, def: Arc<AgentDefinition>, context: &AgentContext) -> ReportSection {
        let agent = SpecialistAgent::new(def.clone(), self.provider.clone(), self.tools.clone())
            .with_max_tool_rounds(self.config.max_tool_rounds);
        let timeout_secs = self.config.agent_timeout_secs;

        let invoked = match tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            agent.invoke(context),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                agent: def.name.clone(),
                secs: timeout_secs,
            }),
        };

        let outcome = match invoked {
            Ok(output) => match self.hook_for(&def.name).after_invocation(output) {
                HookOutcome::Keep(output) => match self.build_artifact(&def, &output.text) {
                    Ok(artifact) => SectionOutcome::Artifact { artifact },
                    Err(e) => failed(&def, e),
                },
                HookOutcome::Suppress => {
                    info!(agent = %def.name, "Output suppressed by hook");
                    SectionOutcome::Suppressed
                }
            },
            Err(e) => failed(&def, e),
        };

        ReportSection {
            output_key: def.output_key.clone(),
            agent: def.name.clone(),
            title: def.title.clone(),
            outcome,
        }
    }

    /// Parse and validate raw agent text against the definition's shape
    pub(crate) fn build_artifact(&self, def: &AgentDefinition, text: &str) -> Result<Artifact> {
        let key = def.output_key.as_str();
        match &def.shape {
            ArtifactShape::ProductTable { categories } => {
                let policy = &self.config.products;
                let mut collection = ProductCollection::parse(key, text, categories)?;

                match self.config.validation {
                    ValidationMode::Strict => {
                        let violations = collection.violations(policy);
                        if let Some((index, violation)) = violations.first() {
                            return Err(Error::schema(
                                key,
                                format!(
                                    "{} of {} products break the rules; first (#{}): {}",
                                    violations.len(),
                                    collection.records.len(),
                                    index + 1,
                                    violation
                                ),
                            ));
                        }
                    }
                    ValidationMode::Filter => {
                        let dropped = collection.retain_valid(policy);
                        if dropped > 0 {
                            warn!(output_key = key, dropped, "Dropped products that break the rules");
                        }
                        if collection.records.is_empty() {
                            return Err(Error::schema(key, "no product met the rules"));
                        }
                    }
                }

                collection.warn_shortfall(key, policy);
                Ok(Artifact::Products(collection))
            }
            ArtifactShape::Markdown { sections } => {
                let doc = MarkdownDocument::parse(key, text)?;
                doc.warn_missing(key, sections);
                Ok(Artifact::Document(doc))
            }
        }
    }
}

fn failed(def: &AgentDefinition, error: Error) -> SectionOutcome {
    warn!(agent = %def.name, kind = %error.kind(), error = %error, "Agent section failed");
    SectionOutcome::Failed {
        kind: error.kind(),
        message: error.to_string(),
    }
}
