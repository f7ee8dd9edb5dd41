//! Registry - Tool registration and discovery
//!
//! Tools are registered once at startup and shared by every specialist agent.
//! An agent only ever sees the subset named in its definition.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Tool category for organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolCategory {
    /// Search operations
    Search,
    /// Utility operations
    Utility,
}

impl ToolCategory {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Utility => "utility",
        }
    }
}

/// Tool metadata and schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON schema for parameters
    pub parameters: serde_json::Value,
    /// Tool category
    pub category: ToolCategory,
    /// Whether the tool is enabled
    pub enabled: bool,
}

impl ToolDefinition {
    /// Create a new tool definition
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
            category: ToolCategory::Utility,
            enabled: true,
        }
    }

    /// Set the parameters schema
    #[must_use]
    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set the category
    #[must_use]
    pub fn with_category(mut self, category: ToolCategory) -> Self {
        self.category = category;
        self
    }

    /// Set enabled status
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Model-facing function declaration
    #[must_use]
    pub fn to_llm(&self) -> mababa_llm::ToolDefinition {
        mababa_llm::ToolDefinition::new(&self.name, &self.description, self.parameters.clone())
    }
}

/// Result of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether execution succeeded
    pub success: bool,
    /// Output data
    pub output: serde_json::Value,
    /// Error message if failed
    pub error: Option<String>,
    /// Execution duration in milliseconds
    pub duration_ms: u64,
}

impl ToolResult {
    /// Create a successful result
    #[must_use]
    pub fn success(output: serde_json::Value, duration_ms: u64) -> Self {
        Self {
            success: true,
            output,
            error: None,
            duration_ms,
        }
    }

    /// Create a failed result
    #[must_use]
    pub fn failure(error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            success: false,
            output: serde_json::Value::Null,
            error: Some(error.into()),
            duration_ms,
        }
    }

    /// JSON payload fed back to the model as the function response
    #[must_use]
    pub fn to_model_content(&self) -> String {
        let value = if self.success {
            self.output.clone()
        } else {
            serde_json::json!({ "error": self.error })
        };
        value.to_string()
    }
}

/// Trait for tool implementations
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool definition
    fn definition(&self) -> &ToolDefinition;

    /// Execute the tool with given input
    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult>;

    /// Validate input before execution
    fn validate_input(&self, input: &serde_json::Value) -> Result<()> {
        if !input.is_object() {
            return Err(Error::InvalidInput("Input must be an object".to_string()));
        }
        Ok(())
    }
}

/// Registry for managing tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.list_names())
            .finish()
    }
}

impl ToolRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name.clone();
        debug!(tool = %name, "Registering tool");
        self.tools.insert(name, tool);
    }

    /// Get a tool by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Check if a tool exists
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all tool names, sorted
    #[must_use]
    pub fn list_names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Get tool count
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Model function declarations for the enabled tools among `names`
    ///
    /// Names not present in the registry are skipped with a warning.
    #[must_use]
    pub fn definitions_for<S: AsRef<str>>(&self, names: &[S]) -> Vec<mababa_llm::ToolDefinition> {
        names
            .iter()
            .filter_map(|name| {
                let name = name.as_ref();
                match self.tools.get(name) {
                    Some(tool) if tool.definition().enabled => Some(tool.definition().to_llm()),
                    Some(_) => None,
                    None => {
                        warn!(tool = %name, "Tool requested but not registered");
                        None
                    }
                }
            })
            .collect()
    }

    /// Execute `name` on behalf of a caller granted `allowed` tools
    ///
    /// Execution errors come back as a failed [`ToolResult`] so the model
    /// sees them; only lookup and permission problems are `Err`.
    pub async fn execute<S: AsRef<str>>(
        &self,
        name: &str,
        allowed: &[S],
        input: serde_json::Value,
    ) -> Result<ToolResult> {
        if !allowed.iter().any(|a| a.as_ref() == name) {
            return Err(Error::NotAllowed(name.to_string()));
        }
        let tool = self
            .get(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        if !tool.definition().enabled {
            return Err(Error::NotAllowed(format!("{name} is disabled")));
        }

        let start = Instant::now();
        let outcome = match tool.validate_input(&input) {
            Ok(()) => tool.execute(input).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool execution failed");
                Ok(ToolResult::failure(
                    e.to_string(),
                    start.elapsed().as_millis() as u64,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool {
        definition: ToolDefinition,
    }

    impl EchoTool {
        fn new(enabled: bool) -> Self {
            Self {
                definition: ToolDefinition::new("echo", "Echo the input")
                    .with_enabled(enabled)
                    .with_parameters(serde_json::json!({
                        "type": "object",
                        "properties": {"text": {"type": "string"}},
                        "required": ["text"]
                    })),
            }
        }
    }

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
            match input.get("text").and_then(|v| v.as_str()) {
                Some(text) => Ok(ToolResult::success(serde_json::json!({"echo": text}), 0)),
                None => Err(Error::InvalidInput("missing text".to_string())),
            }
        }
    }

    fn registry(enabled: bool) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool::new(enabled)));
        registry
    }

    #[test]
    fn test_tool_definition_builder() {
        let def = ToolDefinition::new("web_search", "Search")
            .with_category(ToolCategory::Search)
            .with_enabled(false);

        assert_eq!(def.name, "web_search");
        assert_eq!(def.category.as_str(), "search");
        assert!(!def.enabled);
        assert_eq!(def.to_llm().name, "web_search");
    }

    #[test]
    fn test_tool_result_model_content() {
        let ok = ToolResult::success(serde_json::json!({"data": "test"}), 100);
        assert!(ok.success);
        assert_eq!(ok.to_model_content(), r#"{"data":"test"}"#);

        let failed = ToolResult::failure("boom", 5);
        assert!(!failed.success);
        assert!(failed.to_model_content().contains("boom"));
    }

    #[test]
    fn test_definitions_for_skips_unknown_and_disabled() {
        let reg = registry(true);
        let defs = reg.definitions_for(&["echo", "missing"]);
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "echo");

        let disabled = registry(false);
        assert!(disabled.definitions_for(&["echo"]).is_empty());
    }

    #[tokio::test]
    async fn test_execute_respects_allow_list() {
        let reg = registry(true);
        let result = reg
            .execute("echo", &["web_search"], serde_json::json!({"text": "hi"}))
            .await;
        assert!(matches!(result, Err(Error::NotAllowed(_))));

        let missing = reg
            .execute("nope", &["nope"], serde_json::json!({}))
            .await;
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_execute_turns_tool_errors_into_failed_results() {
        let reg = registry(true);

        let ok = reg
            .execute("echo", &["echo"], serde_json::json!({"text": "hi"}))
            .await
            .unwrap();
        assert!(ok.success);
        assert_eq!(ok.output["echo"], "hi");

        let bad = reg
            .execute("echo", &["echo"], serde_json::json!("not an object"))
            .await
            .unwrap();
        assert!(!bad.success);
        assert!(bad.error.unwrap().contains("Input must be an object"));
    }

    #[test]
    fn test_registry_listing() {
        let reg = registry(true);
        assert_eq!(reg.len(), 1);
        assert!(!reg.is_empty());
        assert!(reg.has("echo"));
        assert_eq!(reg.list_names(), vec!["echo"]);
        assert!(reg.get("echo").is_some());
    }
}
