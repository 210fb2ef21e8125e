//! Execution hooks port
//!
//! Observers notified whenever a capability execution settles (success,
//! failure, or timeout): one hook renders the outcome for the user, the
//! other feeds listeners such as logging or telemetry. Hook failures must
//! never disturb the execution pipeline; the coordinator isolates them.

use toolflow_domain::command::{Command, CommandResult};

/// Observer callbacks around command execution. All methods have no-op
/// defaults, so implementors override only what they need.
pub trait ExecutionHooks: Send + Sync {
    /// Build the user-facing representation of a settled execution.
    fn on_display(&self, _command: &Command, _result: &CommandResult) {}

    /// Notify listeners of a settled execution, for logging or telemetry.
    fn on_result(&self, _command: &Command, _result: &CommandResult) {}
}

/// Hooks implementation that observes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl ExecutionHooks for NoHooks {}
