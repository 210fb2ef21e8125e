//! Meta capabilities: thought logging and user feedback requests.

use async_trait::async_trait;
use std::collections::HashMap;
use toolflow_application::ports::capability::{Capability, CapabilityError, ExecutionContext};
use toolflow_domain::command::{THOUGHT_ACTION, USER_FEEDBACK_ACTION};
use toolflow_domain::tool::{ToolDefinition, ToolParameter};
use tracing::info;

/// Log the model's reasoning step. Always succeeds; the payload echoes the
/// thought so it lands in the conversation record.
pub struct ThoughtCapability;

#[async_trait]
impl Capability for ThoughtCapability {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(THOUGHT_ACTION, "Record a reasoning step before acting")
            .with_parameter(ToolParameter::new("thought", "The reasoning step", true))
            .with_parameter(ToolParameter::new("nextTool", "Action planned next", false))
    }

    async fn invoke(
        &self,
        parameters: &HashMap<String, serde_json::Value>,
        _context: &ExecutionContext,
    ) -> Result<serde_json::Value, CapabilityError> {
        let thought = parameters
            .get("thought")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let next_tool = parameters.get("nextTool").and_then(|v| v.as_str());
        info!(thought, next_tool, "model thought");

        Ok(serde_json::json!({
            "thought": thought,
            "nextTool": next_tool,
        }))
    }
}

/// Ask the user a question. The invocation settles immediately with a
/// pending payload; the answer arrives out of band in a later turn, and the
/// pending status is what pauses the drive loop.
pub struct UserFeedbackCapability;

#[async_trait]
impl Capability for UserFeedbackCapability {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(USER_FEEDBACK_ACTION, "Ask the user a clarifying question")
            .with_parameter(ToolParameter::new("question", "Question for the user", true))
    }

    async fn invoke(
        &self,
        parameters: &HashMap<String, serde_json::Value>,
        _context: &ExecutionContext,
    ) -> Result<serde_json::Value, CapabilityError> {
        let question = parameters
            .get("question")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                CapabilityError::InvalidArgument("missing \"question\" argument".to_string())
            })?;
        info!(question, "feedback requested");

        Ok(serde_json::json!({
            "status": "pending",
            "question": question,
        }))
    }
}
