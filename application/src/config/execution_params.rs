//! Execution parameters.

use std::path::PathBuf;
use std::time::Duration;

/// Tunable limits for a task's execution loop.
#[derive(Debug, Clone)]
pub struct ExecutionParams {
    /// Maximum number of capability invocations per task
    pub max_tool_calls: u32,
    /// Wall-clock timeout for a single capability invocation
    pub tool_timeout: Duration,
    /// Base directory for file capabilities
    pub working_dir: Option<PathBuf>,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            max_tool_calls: 25,
            tool_timeout: Duration::from_secs(30),
            working_dir: None,
        }
    }
}

impl ExecutionParams {
    pub fn with_max_tool_calls(mut self, max: u32) -> Self {
        self.max_tool_calls = max;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ExecutionParams::default();
        assert_eq!(params.max_tool_calls, 25);
        assert_eq!(params.tool_timeout, Duration::from_secs(30));
        assert!(params.working_dir.is_none());
    }

    #[test]
    fn test_builders() {
        let params = ExecutionParams::default()
            .with_max_tool_calls(3)
            .with_tool_timeout(Duration::from_millis(50))
            .with_working_dir("/tmp");
        assert_eq!(params.max_tool_calls, 3);
        assert_eq!(params.tool_timeout, Duration::from_millis(50));
        assert_eq!(params.working_dir.as_deref().unwrap().to_str(), Some("/tmp"));
    }
}
