//! Command entities — tool-invocation requests and their execution records.

use crate::command::value_objects::CommandResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reserved action name for thought logging.
pub const THOUGHT_ACTION: &str = "thought";
/// Reserved action name signalling the model's final step.
pub const FINISHED_ACTION: &str = "finished";
/// Action name for requesting user feedback; its pending result drives
/// the `waiting_for_user` status.
pub const USER_FEEDBACK_ACTION: &str = "get_user_feedback";

/// A request to invoke a named capability, extracted from model text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    /// Capability name; must match a registered tool to pass validation
    pub action: String,
    /// Free-form arguments, interpreted by the capability
    pub parameters: HashMap<String, serde_json::Value>,
    /// Unique per occurrence; generated deterministically when the model
    /// omits it
    pub request_id: String,
    /// True if the model signalled this is its last step
    #[serde(default)]
    pub finished: bool,
}

impl Command {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            parameters: HashMap::new(),
            request_id: String::new(),
            finished: false,
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = id.into();
        self
    }

    pub fn with_finished(mut self, finished: bool) -> Self {
        self.finished = finished;
        self
    }

    /// Whether the action is the reserved "finished" signal (case-insensitive).
    pub fn is_finished_signal(&self) -> bool {
        self.action.eq_ignore_ascii_case(FINISHED_ACTION)
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(|v| v.as_str())
    }

    /// Canonical JSON encoding of the parameters, with object keys sorted.
    ///
    /// serde_json's default `Map` is ordered, so nested objects inside the
    /// values are already canonical; only the top-level `HashMap` needs
    /// re-collecting.
    pub fn canonical_parameters(&self) -> String {
        let map: serde_json::Map<String, serde_json::Value> = self
            .parameters
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        serde_json::Value::Object(map).to_string()
    }

    /// Dedup signature: `(action, canonical parameters, request id)`.
    pub fn signature(&self) -> CommandSignature {
        CommandSignature {
            action: self.action.clone(),
            canonical_parameters: self.canonical_parameters(),
            request_id: if self.request_id.is_empty() {
                "no-id".to_string()
            } else {
                self.request_id.clone()
            },
        }
    }
}

/// Identity of a command for history-aware deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandSignature {
    pub action: String,
    pub canonical_parameters: String,
    pub request_id: String,
}

/// A command paired with its result and a timestamp — the unit stored in
/// conversation history and scanned for deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub command: Command,
    pub result: CommandResult,
    pub timestamp_ms: u64,
}

impl ExecutionRecord {
    pub fn new(command: Command, result: CommandResult) -> Self {
        Self {
            command,
            result,
            timestamp_ms: current_timestamp(),
        }
    }
}

/// Get current timestamp in milliseconds.
fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_builder() {
        let cmd = Command::new("read_file")
            .with_arg("path", "/tmp/test.txt")
            .with_request_id("req-1");

        assert_eq!(cmd.action, "read_file");
        assert_eq!(cmd.get_string("path"), Some("/tmp/test.txt"));
        assert_eq!(cmd.request_id, "req-1");
        assert!(!cmd.finished);
    }

    #[test]
    fn test_finished_signal_case_insensitive() {
        assert!(Command::new("finished").is_finished_signal());
        assert!(Command::new("FINISHED").is_finished_signal());
        assert!(Command::new("Finished").is_finished_signal());
        assert!(!Command::new("finish_line").is_finished_signal());
    }

    #[test]
    fn test_canonical_parameters_sorted() {
        let cmd = Command::new("x").with_arg("zeta", 1).with_arg("alpha", 2);
        assert_eq!(cmd.canonical_parameters(), r#"{"alpha":2,"zeta":1}"#);
    }

    #[test]
    fn test_signature_equality_ignores_arg_order() {
        let a = Command::new("write_file")
            .with_arg("path", "a.txt")
            .with_arg("content", "hi")
            .with_request_id("r1");
        let b = Command::new("write_file")
            .with_arg("content", "hi")
            .with_arg("path", "a.txt")
            .with_request_id("r1");
        assert_eq!(a.signature(), b.signature());
    }

    #[test]
    fn test_signature_missing_request_id_uses_placeholder() {
        let cmd = Command::new("thought");
        assert_eq!(cmd.signature().request_id, "no-id");
    }

    #[test]
    fn test_execution_record_timestamp() {
        let record = ExecutionRecord::new(
            Command::new("thought"),
            CommandResult::success("r", json!({})),
        );
        assert!(record.timestamp_ms > 0);
    }

    #[test]
    fn test_command_wire_format() {
        let json = json!({
            "action": "read_file",
            "parameters": {"path": "x"},
            "requestId": "req-7"
        });
        let cmd: Command = serde_json::from_value(json).unwrap();
        assert_eq!(cmd.action, "read_file");
        assert_eq!(cmd.request_id, "req-7");
        assert!(!cmd.finished);
    }
}
