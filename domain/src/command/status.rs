//! Task status resolution.
//!
//! After a turn executes, the status of the overall task is derived from the
//! turn's fresh execution records and the budget state. A turn that executed
//! nothing completes the task; otherwise pending user feedback outranks a
//! spent budget, which outranks plain running.

use crate::command::budget::ExecutionBudget;
use crate::command::entities::{ExecutionRecord, USER_FEEDBACK_ACTION};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a task driving the execution loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// No task has started
    Idle,
    /// A turn is being processed
    Running,
    /// A feedback request is unanswered; the loop pauses for the user
    WaitingForUser,
    /// The execution budget is spent; the loop pauses, resumable
    LimitReached,
    /// The model signalled it is done, or a turn executed to completion
    Completed,
    /// The task was cancelled externally
    Stopped,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Idle => "idle",
            TaskStatus::Running => "running",
            TaskStatus::WaitingForUser => "waiting_for_user",
            TaskStatus::LimitReached => "limit_reached",
            TaskStatus::Completed => "completed",
            TaskStatus::Stopped => "stopped",
        }
    }

    /// Whether the loop keeps driving from this state on its own.
    /// `LimitReached` is not continuable here, but a task stopped there can
    /// still be resumed explicitly with an extended budget.
    pub fn can_continue(&self) -> bool {
        matches!(self, TaskStatus::Running | TaskStatus::WaitingForUser)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Stopped)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status plus the numbers that explain it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusReport {
    pub status: TaskStatus,
    pub tool_execution_count: u32,
    pub max_tool_executions: u32,
    pub can_continue: bool,
}

/// Derive the post-turn status from the turn's fresh records and the budget.
///
/// A turn that executed nothing is complete. Otherwise pending user
/// feedback takes priority over a spent budget, which takes priority over
/// plain running. Only freshly executed records count; replayed history
/// never flips the status.
pub fn resolve_status(fresh_records: &[ExecutionRecord], budget: &ExecutionBudget) -> TaskStatus {
    if fresh_records.is_empty() {
        return TaskStatus::Completed;
    }
    let pending_feedback = fresh_records
        .iter()
        .any(|r| r.command.action == USER_FEEDBACK_ACTION && r.result.is_pending_feedback());
    if pending_feedback {
        return TaskStatus::WaitingForUser;
    }
    if budget.is_exhausted() {
        return TaskStatus::LimitReached;
    }
    TaskStatus::Running
}

pub fn resolve_report(
    fresh_records: &[ExecutionRecord],
    budget: &ExecutionBudget,
) -> TaskStatusReport {
    let status = resolve_status(fresh_records, budget);
    TaskStatusReport {
        status,
        tool_execution_count: budget.executed(),
        max_tool_executions: budget.effective_limit(),
        can_continue: status.can_continue(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::entities::Command;
    use crate::command::value_objects::CommandResult;
    use serde_json::json;

    fn plain_record() -> ExecutionRecord {
        ExecutionRecord::new(
            Command::new("read_file").with_request_id("r1"),
            CommandResult::success("r1", json!({"content": "x"})),
        )
    }

    fn pending_record() -> ExecutionRecord {
        ExecutionRecord::new(
            Command::new("get_user_feedback").with_request_id("r2"),
            CommandResult::success("r2", json!({"status": "pending", "question": "ok?"})),
        )
    }

    #[test]
    fn test_pending_feedback_outranks_limit() {
        let budget = ExecutionBudget::new(1);
        budget.record(1);
        let status = resolve_status(&[pending_record()], &budget);
        assert_eq!(status, TaskStatus::WaitingForUser);
        assert!(status.can_continue());
    }

    #[test]
    fn test_exhausted_budget_reports_limit_reached() {
        let budget = ExecutionBudget::new(1);
        budget.record(1);
        let status = resolve_status(&[plain_record()], &budget);
        assert_eq!(status, TaskStatus::LimitReached);
        assert!(!status.can_continue());
    }

    #[test]
    fn test_ordinary_turn_keeps_running() {
        let budget = ExecutionBudget::new(5);
        budget.record(1);
        assert_eq!(resolve_status(&[plain_record()], &budget), TaskStatus::Running);
    }

    #[test]
    fn test_empty_turn_completes() {
        let budget = ExecutionBudget::new(5);
        assert_eq!(resolve_status(&[], &budget), TaskStatus::Completed);
    }

    #[test]
    fn test_empty_turn_completes_even_with_spent_budget() {
        let budget = ExecutionBudget::new(1);
        budget.record(1);
        assert_eq!(resolve_status(&[], &budget), TaskStatus::Completed);
    }

    #[test]
    fn test_report_carries_budget_numbers() {
        let budget = ExecutionBudget::new(3);
        budget.record(2);
        let report = resolve_report(&[plain_record()], &budget);
        assert_eq!(report.tool_execution_count, 2);
        assert_eq!(report.max_tool_executions, 3);
        assert_eq!(report.status, TaskStatus::Running);
        assert!(report.can_continue);
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_value(TaskStatus::WaitingForUser).unwrap();
        assert_eq!(json, "waiting_for_user");
        assert_eq!(TaskStatus::LimitReached.to_string(), "limit_reached");
    }

    #[test]
    fn test_terminal_states_cannot_continue() {
        assert!(!TaskStatus::Completed.can_continue());
        assert!(!TaskStatus::Stopped.can_continue());
        assert!(!TaskStatus::Idle.can_continue());
        assert!(TaskStatus::Completed.is_terminal());
    }
}
