//! MaBaba Core - Parental consultancy orchestration
//!
//! This crate provides the consultant itself:
//! - Agents: immutable specialist definitions, the built-in catalog, the tool-calling loop
//! - Routing: deterministic intent rules and a model-backed classifier
//! - Artifacts: product records, markdown documents, report rendering
//! - Orchestrator: concurrent specialist invocation and per-section aggregation
//! - Runner: in-memory session that carries conversation history between turns

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod agents;
pub mod artifacts;
pub mod credentials;
pub mod error;
pub mod orchestrator;
pub mod routing;
pub mod runner;

pub use agents::{
    AgentCatalog, AgentContext, AgentDefinition, AgentOutput, ArtifactShape, HookOutcome,
    ModelSettings, OutputHook, PassThrough, SpecialistAgent, SuppressOutput,
};
pub use artifacts::{
    Artifact, ConsultancyReport, MarkdownDocument, ProductCollection, ProductPolicy,
    ProductRecord, ReportSection, SectionOutcome,
};
pub use credentials::{resolve_api_key, EnvSecretSource, SecretSource};
pub use error::{format_error_for_chat, format_error_for_cli, Error, ErrorKind, Result, UserFriendlyError};
pub use orchestrator::{
    ConsultancyResponse, Orchestrator, OrchestratorConfig, RoutingMode, ValidationMode,
    FALLBACK_RESPONSE, IDENTITY_RESPONSE,
};
pub use routing::{Intent, IntentClassifier, ModelIntentClassifier, RoutingDecision, RuleClassifier};
pub use runner::{Runner, Session, Turn};
