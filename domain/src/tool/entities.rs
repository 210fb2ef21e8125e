//! Tool catalog entities
//!
//! The catalog is the set of capability names (plus their descriptors) the
//! validator checks command actions against. Registration happens once at
//! startup from whatever capability source the infrastructure layer wires in.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Definition of a capability the model may invoke
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "read_file")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Parameter specifications
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    /// Parameter type hint (e.g., "string", "path", "number")
    pub param_type: String,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }
}

/// The set of registered capabilities, keyed by canonical name.
///
/// This is the known-name set consumed by command validation; actual
/// execution routing lives behind the registry port in the application layer.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: HashMap<String, ToolDefinition>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(mut self, tool: ToolDefinition) -> Self {
        self.tools.insert(tool.name.clone(), tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn all(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(|s| s.as_str())
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
    fn test_tool_definition() {
        let tool = ToolDefinition::new("read_file", "Read file contents")
            .with_parameter(ToolParameter::new("path", "File path to read", true).with_type("path"));

        assert_eq!(tool.name, "read_file");
        assert_eq!(tool.parameters.len(), 1);
        assert_eq!(tool.parameters[0].name, "path");
        assert!(tool.parameters[0].required);
    }

    #[test]
    fn test_catalog_register_and_lookup() {
        let catalog = ToolCatalog::new()
            .register(ToolDefinition::new("read_file", "Read file"))
            .register(ToolDefinition::new("write_file", "Write file"));

        assert!(catalog.contains("read_file"));
        assert!(catalog.contains("write_file"));
        assert!(!catalog.contains("unknown"));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("read_file").unwrap().name, "read_file");
    }

    #[test]
    fn test_catalog_names() {
        let catalog = ToolCatalog::new().register(ToolDefinition::new("thought", "Log a thought"));
        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(names, vec!["thought"]);
    }
}
