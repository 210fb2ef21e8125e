//! Command value objects — immutable execution results.
//!
//! Every capability invocation settles into a [`CommandResult`]: success with
//! a data payload, or failure with a message. The result echoes the
//! originating command's request id so records can be matched back to the
//! command that produced them.

use serde::{Deserialize, Serialize};

/// Outcome of executing a [`Command`](crate::command::entities::Command).
///
/// `data` is present iff `success`; `error` is present iff not.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    /// Whether the execution succeeded
    pub success: bool,
    /// Output payload (for successful execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Error message (for failed execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Request id echoed from the originating command
    pub request_id: String,
}

impl CommandResult {
    /// Create a successful result
    pub fn success(request_id: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            request_id: request_id.into(),
        }
    }

    /// Create a failed result
    pub fn failure(request_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            request_id: request_id.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Whether this result marks an unanswered user-feedback request.
    ///
    /// A pending feedback result is a success payload carrying
    /// `"status": "pending"`; the answer arrives in a later turn through the
    /// UI collaborator.
    pub fn is_pending_feedback(&self) -> bool {
        self.success
            && self
                .data
                .as_ref()
                .and_then(|d| d.get("status"))
                .and_then(|s| s.as_str())
                .is_some_and(|s| s == "pending")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_result() {
        let result = CommandResult::success("req-1", json!({"content": "hello"}));
        assert!(result.is_success());
        assert!(result.error.is_none());
        assert_eq!(result.data.unwrap()["content"], "hello");
        assert_eq!(result.request_id, "req-1");
    }

    #[test]
    fn test_failure_result() {
        let result = CommandResult::failure("req-2", "file not found");
        assert!(!result.is_success());
        assert!(result.data.is_none());
        assert_eq!(result.error.as_deref(), Some("file not found"));
    }

    #[test]
    fn test_pending_feedback_detection() {
        let pending = CommandResult::success("r", json!({"status": "pending", "question": "ok?"}));
        assert!(pending.is_pending_feedback());

        let answered = CommandResult::success("r", json!({"status": "answered"}));
        assert!(!answered.is_pending_feedback());

        let plain = CommandResult::success("r", json!({"content": "x"}));
        assert!(!plain.is_pending_feedback());

        let failed = CommandResult::failure("r", "nope");
        assert!(!failed.is_pending_feedback());
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let result = CommandResult::failure("req-9", "boom");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["requestId"], "req-9");
        assert!(json.get("data").is_none());
    }
}
