//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and environment.

use super::config::AppConfig;
use anyhow::{Context, Result};
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use config::builder::DefaultState;

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

fn base_builder() -> ConfigBuilder<DefaultState> {
    // 1. Embedded defaults (always available)
    Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
}

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    let config = base_builder()
        // 2. External overrides (optional)
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name("config/local").required(false))
        // 3. Environment variables (highest priority)
        // MABABA_ORCHESTRATOR__ROUTING=model: single "_" after the prefix,
        // "__" between nested keys.
        .add_source(
            Environment::with_prefix("MABABA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}
