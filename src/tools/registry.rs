//! Tool registry.
//!
//! Holds registered tools, looks them up by name and exports their
//! definitions for model requests.

use std::collections::HashMap;
use std::sync::Arc;

use super::types::Tool;
use crate::llm::ToolDefinition;

/// Registry of available tools, keyed by name.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_owned(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Sorted names of all registered tools.
    pub fn list_available(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Definitions of every registered tool, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.list_available())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::types::{ToolError, ToolResult};
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct EchoTool(&'static str);

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            "Echo the input"
        }
        fn schema(&self) -> Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }
        async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
            Ok(ToolResult::success(args.to_string()))
        }
    }

    #[test]
    fn register_and_get() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());
        registry.register(Arc::new(EchoTool("echo")));
        assert!(registry.exists("echo"));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn register_replaces_same_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool("echo")));
        registry.register(Arc::new(EchoTool("echo")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn definitions_sorted_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool("zeta")));
        registry.register(Arc::new(EchoTool("alpha")));
        let defs = registry.definitions();
        assert_eq!(defs[0].name, "alpha");
        assert_eq!(defs[1].name, "zeta");
        assert_eq!(defs[0].description, "Echo the input");
        assert_eq!(defs[0].parameters["type"], "object");
        assert_eq!(registry.list_available(), vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn executes_through_registry() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool("echo")));
        let tool = match registry.get("echo") {
            Some(t) => t,
            None => unreachable!("registered"),
        };
        let result = tool.execute(json!({"text": "hi"})).await;
        assert!(matches!(result, Ok(r) if r.content.contains("hi")));
    }
}
