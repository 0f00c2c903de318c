//! Tools an agent can invoke.

pub mod calculator;

use std::collections::BTreeMap;

use crate::error::ToolError;
use crate::types::ToolDeclaration;

pub use calculator::Calculator;

/// A named capability with a fixed input schema.
pub trait Tool: Send + Sync {
    /// Name the model uses to call this tool.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema of the arguments object.
    fn parameters(&self) -> serde_json::Value;

    /// Run the tool synchronously.
    fn call(&self, arguments: &serde_json::Value) -> Result<String, ToolError>;

    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Tools available to an agent, keyed by name.
#[derive(Default)]
pub struct ToolSet {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, replacing any tool with the same name.
    pub fn with<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.insert(Box::new(tool));
        self
    }

    pub fn insert(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        self.tools.values().map(|tool| tool.declaration()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        let tools = ToolSet::new().with(Calculator);
        assert_eq!(tools.names(), vec!["calculator"]);
        assert!(tools.get("calculator").is_some());
        assert!(tools.get("weather").is_none());
    }

    #[test]
    fn test_declarations_expose_schema() {
        let declarations = ToolSet::new().with(Calculator).declarations();
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].name, "calculator");
        assert_eq!(declarations[0].parameters["required"][0], "expression");
    }
}
