//! File capabilities: read, write, rename.
//!
//! Relative paths resolve against the execution context's working
//! directory. Writes create missing parent directories; renames refuse to
//! clobber an existing destination.

use async_trait::async_trait;
use std::collections::HashMap;
use toolflow_application::ports::capability::{Capability, CapabilityError, ExecutionContext};
use toolflow_domain::tool::{ToolDefinition, ToolParameter};
use tracing::debug;

const MAX_READ_BYTES: u64 = 1_048_576;

fn require_str<'a>(
    parameters: &'a HashMap<String, serde_json::Value>,
    key: &str,
) -> Result<&'a str, CapabilityError> {
    parameters
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| CapabilityError::InvalidArgument(format!("missing \"{key}\" argument")))
}

/// Read a file's contents.
pub struct ReadFileCapability;

#[async_trait]
impl Capability for ReadFileCapability {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("read_file", "Read the contents of a file")
            .with_parameter(ToolParameter::new("path", "Path of the file to read", true).with_type("path"))
    }

    async fn invoke(
        &self,
        parameters: &HashMap<String, serde_json::Value>,
        context: &ExecutionContext,
    ) -> Result<serde_json::Value, CapabilityError> {
        let path = context.resolve(require_str(parameters, "path")?);
        debug!(path = %path.display(), "read_file");

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|_| CapabilityError::NotFound(path.display().to_string()))?;
        if metadata.len() > MAX_READ_BYTES {
            return Err(CapabilityError::Failed(format!(
                "file too large: {} bytes (limit {MAX_READ_BYTES})",
                metadata.len()
            )));
        }

        let content = tokio::fs::read_to_string(&path).await?;
        Ok(serde_json::json!({
            "path": path.display().to_string(),
            "content": content,
            "size": metadata.len(),
        }))
    }
}

/// Write content to a file, creating parent directories as needed.
pub struct WriteFileCapability;

#[async_trait]
impl Capability for WriteFileCapability {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("write_file", "Write content to a file, creating it if missing")
            .with_parameter(ToolParameter::new("path", "Path of the file to write", true).with_type("path"))
            .with_parameter(ToolParameter::new("content", "Content to write", true))
    }

    async fn invoke(
        &self,
        parameters: &HashMap<String, serde_json::Value>,
        context: &ExecutionContext,
    ) -> Result<serde_json::Value, CapabilityError> {
        let path = context.resolve(require_str(parameters, "path")?);
        let content = require_str(parameters, "content")?;
        debug!(path = %path.display(), bytes = content.len(), "write_file");

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, content).await?;
        Ok(serde_json::json!({
            "path": path.display().to_string(),
            "bytesWritten": content.len(),
        }))
    }
}

/// Rename or move a file.
pub struct RenameFileCapability;

#[async_trait]
impl Capability for RenameFileCapability {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("rename_file", "Rename or move a file")
            .with_parameter(ToolParameter::new("path", "Current path of the file", true).with_type("path"))
            .with_parameter(ToolParameter::new("newPath", "New path for the file", true).with_type("path"))
    }

    async fn invoke(
        &self,
        parameters: &HashMap<String, serde_json::Value>,
        context: &ExecutionContext,
    ) -> Result<serde_json::Value, CapabilityError> {
        let from = context.resolve(require_str(parameters, "path")?);
        let to = context.resolve(require_str(parameters, "newPath")?);
        debug!(from = %from.display(), to = %to.display(), "rename_file");

        if !tokio::fs::try_exists(&from).await? {
            return Err(CapabilityError::NotFound(from.display().to_string()));
        }
        if tokio::fs::try_exists(&to).await? {
            return Err(CapabilityError::Failed(format!(
                "destination already exists: {}",
                to.display()
            )));
        }
        if let Some(parent) = to.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::rename(&from, &to).await?;
        Ok(serde_json::json!({
            "from": from.display().to_string(),
            "to": to.display().to_string(),
        }))
    }
}
