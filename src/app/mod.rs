//! Application wiring
//!
//! - `config`: `AppConfig` and its sections
//! - `loader`: layered configuration loading
//! - `init`: builds the provider, tool registry, catalog and orchestrator

pub mod config;
pub mod init;
pub mod loader;

pub use init::{build_app, build_catalog};
pub use loader::load_config;
