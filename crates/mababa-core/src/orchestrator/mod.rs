//! Orchestrator ("agent_mababa")
//!
//! Classifies a request, invokes the selected specialists concurrently and
//! aggregates their artifacts per output key into a [`ConsultancyReport`].
//!
//! # Module Structure
//!
//! - `config`: settings (timeouts, routing and validation modes, product policy)
//! - `core`: `Orchestrator` struct and builder methods
//! - `execution`: the per-turn fan-out and aggregation
//! - `types`: response type and fixed replies
//!
//! [`ConsultancyReport`]: crate::artifacts::ConsultancyReport

mod config;
mod core;
mod execution;
mod types;


pub use config::{OrchestratorConfig, RoutingMode, ValidationMode};
pub use core::Orchestrator;
pub use types::{ConsultancyResponse, FALLBACK_RESPONSE, IDENTITY_RESPONSE};
