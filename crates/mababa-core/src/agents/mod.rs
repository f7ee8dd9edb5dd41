//! Specialist agents
//!
//! An [`AgentDefinition`] is immutable once built and shared through `Arc`.
//! [`SpecialistAgent`] binds one definition to a model client and the tool
//! registry and runs a bounded tool-calling loop per invocation.

mod catalog;
mod config;
mod hooks;
mod specialist;

pub(crate) use catalog::{NEWBORN_CATEGORIES, NEWMOM_CATEGORIES};
pub use catalog::{AgentCatalog, BEHAVIORAL, NEWBORN_PRODUCTS, NEWMOM_PRODUCTS, PARENTAL_EDUCATION};
pub use config::{AgentDefinition, ArtifactShape, ModelSettings};
pub use hooks::{HookOutcome, OutputHook, PassThrough, SuppressOutput};
pub use specialist::{AgentContext, AgentOutput, SpecialistAgent, DEFAULT_MAX_TOOL_ROUNDS};
