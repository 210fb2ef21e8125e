//! Capability registry.
//!
//! Concrete adapter behind the application layer's registry port. Built
//! once at startup; the catalog it derives from registered definitions is
//! what command validation checks action names against.

use crate::tools::file::{ReadFileCapability, RenameFileCapability, WriteFileCapability};
use crate::tools::meta::{ThoughtCapability, UserFeedbackCapability};
use crate::tools::search::SearchFilesCapability;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use toolflow_application::ports::capability::{Capability, CapabilityRegistryPort};
use toolflow_domain::tool::ToolCatalog;

/// Routes action names to capability implementations.
#[derive(Default)]
pub struct CapabilityRegistry {
    capabilities: HashMap<String, Arc<dyn Capability>>,
    catalog: ToolCatalog,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in capabilities: file operations, search,
    /// and the meta actions.
    pub fn builtin() -> Self {
        Self::new()
            .register(ReadFileCapability)
            .register(WriteFileCapability)
            .register(RenameFileCapability)
            .register(SearchFilesCapability)
            .register(ThoughtCapability)
            .register(UserFeedbackCapability)
    }

    pub fn register(self, capability: impl Capability + 'static) -> Self {
        self.register_arc(Arc::new(capability))
    }

    pub fn register_arc(mut self, capability: Arc<dyn Capability>) -> Self {
        let definition = capability.definition();
        self.capabilities.insert(definition.name.clone(), capability);
        self.catalog = self.catalog.register(definition);
        self
    }
}

#[async_trait]
impl CapabilityRegistryPort for CapabilityRegistry {
    fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    fn get(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.capabilities.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_covers_standard_actions() {
        let registry = CapabilityRegistry::builtin();
        for name in [
            "read_file",
            "write_file",
            "rename_file",
            "search_files",
            "thought",
            "get_user_feedback",
        ] {
            assert!(registry.has(name), "missing capability: {name}");
            assert!(registry.get(name).is_some());
        }
        assert_eq!(registry.catalog().len(), 6);
    }

    #[test]
    fn test_unregistered_name_misses() {
        let registry = CapabilityRegistry::builtin();
        assert!(!registry.has("launch_rockets"));
        assert!(registry.get("launch_rockets").is_none());
    }

    #[test]
    fn test_later_registration_wins() {
        let registry = CapabilityRegistry::new()
            .register(ThoughtCapability)
            .register(ThoughtCapability);
        assert_eq!(registry.catalog().len(), 1);
    }
}
