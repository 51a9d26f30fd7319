//! Registry - Tool registration and lookup
//!
//! This module provides the process-wide registry mapping a tool kind to a
//! tool implementation. Agents resolve auxiliary capabilities (web search,
//! URL fetch, knowledge lookup) through this registry instead of holding
//! direct references, so implementations can be swapped without touching
//! dispatch logic.
//!
//! Registering a second tool under an already-used kind overwrites the
//! first registration silently. The system expects one tool per kind; the
//! last registration wins.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Tool metadata and parameter schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool kind — the registry key (e.g. `"web_search"`)
    pub kind: String,
    /// Human-readable description
    pub description: String,
    /// JSON schema for input parameters
    pub parameters: serde_json::Value,
}

impl ToolDescriptor {
    /// Create a new tool descriptor
    #[must_use]
    pub fn new(kind: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            description: description.into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        }
    }

    /// Set the parameters schema
    #[must_use]
    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Result of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutcome {
    /// Whether execution succeeded
    pub success: bool,
    /// Output data
    pub output: serde_json::Value,
    /// Error message if failed
    pub error: Option<String>,
    /// Execution duration in milliseconds
    pub duration_ms: u64,
}

impl ToolOutcome {
    /// Create a successful outcome
    #[must_use]
    pub fn success(output: serde_json::Value, duration_ms: u64) -> Self {
        Self {
            success: true,
            output,
            error: None,
            duration_ms,
        }
    }

    /// Create a failed outcome
    #[must_use]
    pub fn failure(error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            success: false,
            output: serde_json::Value::Null,
            error: Some(error.into()),
            duration_ms,
        }
    }
}

/// Trait for tool implementations
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool descriptor
    fn descriptor(&self) -> &ToolDescriptor;

    /// Execute the tool with given input
    async fn execute(&self, input: serde_json::Value) -> Result<ToolOutcome>;

    /// Validate input before execution
    fn validate_input(&self, input: &serde_json::Value) -> Result<()> {
        if !input.is_object() {
            return Err(Error::InvalidInput("input must be an object".to_string()));
        }
        Ok(())
    }
}

/// Registry for managing tools, keyed by kind
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool under its descriptor's kind.
    ///
    /// A duplicate kind overwrites the existing registration (last write
    /// wins). There is no removal operation.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let kind = tool.descriptor().kind.clone();
        if self.tools.contains_key(&kind) {
            debug!(kind = %kind, "Replacing existing tool registration");
        } else {
            debug!(kind = %kind, "Registering tool");
        }
        self.tools.insert(kind, tool);
    }

    /// Get a tool by kind
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(kind).cloned()
    }

    /// Check if a tool kind is registered
    #[must_use]
    pub fn has(&self, kind: &str) -> bool {
        self.tools.contains_key(kind)
    }

    /// List all registered tools
    #[must_use]
    pub fn all(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.values().cloned().collect()
    }

    /// List all registered kinds
    #[must_use]
    pub fn kinds(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
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
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticTool {
        descriptor: ToolDescriptor,
        reply: &'static str,
    }

    impl StaticTool {
        fn new(kind: &str, reply: &'static str) -> Self {
            Self {
                descriptor: ToolDescriptor::new(kind, "static test tool"),
                reply,
            }
        }
    }

    #[async_trait::async_trait]
    impl Tool for StaticTool {
        fn descriptor(&self) -> &ToolDescriptor {
            &self.descriptor
        }

        async fn execute(&self, _input: serde_json::Value) -> Result<ToolOutcome> {
            Ok(ToolOutcome::success(serde_json::json!(self.reply), 0))
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(StaticTool::new("web_search", "a")));

        assert!(registry.has("web_search"));
        assert!(registry.get("web_search").is_some());
        assert!(registry.get("url_pull").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_kind_overwrites() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(StaticTool::new("web_search", "first")));
        registry.register(Arc::new(StaticTool::new("web_search", "second")));

        assert_eq!(registry.len(), 1);
        let tool = registry.get("web_search").unwrap();
        let outcome = tokio_test::block_on(tool.execute(serde_json::json!({}))).unwrap();
        assert_eq!(outcome.output, serde_json::json!("second"));
    }

    #[test]
    fn test_kinds_listing() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(StaticTool::new("web_search", "a")));
        registry.register(Arc::new(StaticTool::new("url_pull", "b")));

        let mut kinds = registry.kinds();
        kinds.sort();
        assert_eq!(kinds, vec!["url_pull", "web_search"]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.kinds().is_empty());
        assert!(registry.all().is_empty());
    }

    #[test]
    fn test_default_validate_rejects_non_object() {
        let tool = StaticTool::new("web_search", "a");
        assert!(tool.validate_input(&serde_json::json!("string")).is_err());
        assert!(tool.validate_input(&serde_json::json!({})).is_ok());
    }
}
