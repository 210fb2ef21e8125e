//! Configuration file schema.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use toolflow_application::config::ExecutionParams;

/// On-disk configuration, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub execution: ExecutionConfig,
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Maximum capability invocations per task
    pub max_tool_calls: u32,
    /// Per-invocation timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_tool_calls: 25,
            timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Base directory for file capabilities; defaults to the process cwd
    pub working_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn to_execution_params(&self) -> ExecutionParams {
        let mut params = ExecutionParams::default()
            .with_max_tool_calls(self.execution.max_tool_calls)
            .with_tool_timeout(Duration::from_millis(self.execution.timeout_ms));
        if let Some(dir) = &self.tools.working_dir {
            params = params.with_working_dir(dir.clone());
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FileConfig::default();
        assert_eq!(config.execution.max_tool_calls, 25);
        assert_eq!(config.execution.timeout_ms, 30_000);
        assert!(config.tools.working_dir.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
            [execution]
            max_tool_calls = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.execution.max_tool_calls, 5);
        assert_eq!(config.execution.timeout_ms, 30_000);
    }

    #[test]
    fn test_to_execution_params() {
        let config: FileConfig = toml::from_str(
            r#"
            [execution]
            max_tool_calls = 3
            timeout_ms = 500

            [tools]
            working_dir = "/srv/work"
            "#,
        )
        .unwrap();
        let params = config.to_execution_params();
        assert_eq!(params.max_tool_calls, 3);
        assert_eq!(params.tool_timeout, Duration::from_millis(500));
        assert_eq!(params.working_dir.as_deref().unwrap().to_str(), Some("/srv/work"));
    }
}
