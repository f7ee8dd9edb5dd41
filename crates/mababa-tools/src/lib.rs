//! MaBaba Tools - Tool registry and builtin tools
//!
//! This crate provides the tools specialist agents may call:
//! - Registry: tool registration and lookup, conversion to model function declarations
//! - Builtins: `web_search` over the DuckDuckGo HTML endpoint

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builtins;
pub mod error;
pub mod registry;

pub use builtins::{register_builtins, SearchConfig, WebSearchTool};
pub use error::{Error, Result};
pub use registry::{Tool, ToolCategory, ToolDefinition, ToolRegistry, ToolResult};
