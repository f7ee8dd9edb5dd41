//! Builtin tools

mod web_search;

pub use web_search::{SearchConfig, WebSearchTool};

use crate::registry::ToolRegistry;
use std::sync::Arc;
use tracing::debug;

/// Register every builtin tool that the configuration enables
pub fn register_builtins(registry: &mut ToolRegistry, search: &SearchConfig) {
    if search.enabled {
        registry.register(Arc::new(WebSearchTool::new(search.clone())));
    } else {
        debug!("web_search disabled by configuration");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_respects_enabled_flag() {
        let mut registry = ToolRegistry::new();
        register_builtins(&mut registry, &SearchConfig::default());
        assert!(registry.has("web_search"));

        let mut registry = ToolRegistry::new();
        let disabled = SearchConfig {
            enabled: false,
            ..SearchConfig::default()
        };
        register_builtins(&mut registry, &disabled);
        assert!(registry.is_empty());
    }
}
