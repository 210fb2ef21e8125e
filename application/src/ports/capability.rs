//! Capability port
//!
//! Defines the interface for invoking capabilities (file operations,
//! searches, meta actions) and for the registry that routes action names to
//! them. Implementations (adapters) live in the infrastructure layer.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use toolflow_domain::tool::{ToolCatalog, ToolDefinition};

/// Ambient settings available to every capability invocation.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// Base directory for resolving relative paths
    pub working_dir: Option<PathBuf>,
}

impl ExecutionContext {
    pub fn with_working_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: Some(dir.into()),
        }
    }

    /// Resolve a possibly-relative path against the working directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let candidate = PathBuf::from(path);
        if candidate.is_absolute() {
            return candidate;
        }
        match &self.working_dir {
            Some(base) => base.join(candidate),
            None => candidate,
        }
    }
}

/// Errors a capability invocation can produce.
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Failed(String),
}

/// A single invokable capability.
#[async_trait]
pub trait Capability: Send + Sync {
    /// The definition advertised to the model and the validator.
    fn definition(&self) -> ToolDefinition;

    /// Invoke with the command's raw parameters. Returns the JSON payload
    /// placed into the command result's `data` field.
    async fn invoke(
        &self,
        parameters: &HashMap<String, serde_json::Value>,
        context: &ExecutionContext,
    ) -> Result<serde_json::Value, CapabilityError>;
}

/// Port for capability lookup and cataloguing.
#[async_trait]
pub trait CapabilityRegistryPort: Send + Sync {
    /// The catalog of registered capability definitions.
    fn catalog(&self) -> &ToolCatalog;

    /// Look up a capability by action name.
    fn get(&self, name: &str) -> Option<Arc<dyn Capability>>;

    /// Check if a capability is registered.
    fn has(&self, name: &str) -> bool {
        self.catalog().contains(name)
    }

    /// Names of all registered capabilities.
    fn available(&self) -> Vec<&str> {
        self.catalog().names().collect()
    }
}
