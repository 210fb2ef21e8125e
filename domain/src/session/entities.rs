//! Conversation session entities.

use crate::command::entities::ExecutionRecord;
use serde::{Deserialize, Serialize};

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn of conversation, with any tool executions it carried.
///
/// Assistant turns own the execution records produced while processing the
/// model's response; the dedup filter scans those when building its index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_records: Vec<ExecutionRecord>,
}

impl TurnMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_records: Vec::new(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn with_tool_records(mut self, records: Vec<ExecutionRecord>) -> Self {
        self.tool_records = records;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::entities::Command;
    use crate::command::value_objects::CommandResult;
    use serde_json::json;

    #[test]
    fn test_constructors() {
        assert_eq!(TurnMessage::user("hi").role, Role::User);
        assert_eq!(TurnMessage::assistant("ok").role, Role::Assistant);
        assert_eq!(TurnMessage::system("rules").role, Role::System);
    }

    #[test]
    fn test_empty_records_skipped_in_wire_format() {
        let json = serde_json::to_value(TurnMessage::user("hi")).unwrap();
        assert!(json.get("toolRecords").is_none());
    }

    #[test]
    fn test_records_survive_round_trip() {
        let record = ExecutionRecord::new(
            Command::new("thought").with_request_id("r1"),
            CommandResult::success("r1", json!({})),
        );
        let turn = TurnMessage::assistant("done").with_tool_records(vec![record]);
        let json = serde_json::to_value(&turn).unwrap();
        let back: TurnMessage = serde_json::from_value(json).unwrap();
        assert_eq!(back.tool_records.len(), 1);
        assert_eq!(back.tool_records[0].command.action, "thought");
    }
}
