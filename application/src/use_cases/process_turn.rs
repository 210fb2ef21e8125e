//! Turn processing.
//!
//! Takes one raw model response plus the conversation history and runs the
//! full pipeline: extract, consume finished signals, validate against the
//! catalog, deduplicate against history, then execute sequentially under the
//! budget. Commands that arrive after the budget is spent are dropped
//! without executing; the outcome records them so callers can see what was
//! cut.

use crate::use_cases::coordinator::ExecutionCoordinator;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use toolflow_domain::command::{
    Command, DedupFilter, ExecutionBudget, ExecutionRecord, TaskStatusReport, ValidationError,
    clean_text, extract, resolve_report, validate_command,
};
use toolflow_domain::session::TurnMessage;
use tracing::{debug, info, warn};

use crate::ports::capability::CapabilityRegistryPort;

/// Everything a processed turn produced.
#[derive(Debug)]
pub struct TurnOutcome {
    /// Records for commands executed this turn
    pub records: Vec<ExecutionRecord>,
    /// Records replayed from history instead of re-executing
    pub replayed: Vec<ExecutionRecord>,
    /// Commands dropped because the budget ran out mid-batch
    pub dropped: Vec<Command>,
    /// Commands rejected by validation, with the reason
    pub invalid: Vec<(Command, ValidationError)>,
    /// Response text with extracted command JSON removed
    pub clean_text: String,
    /// Whether the model signalled it is finished
    pub finished: bool,
    /// Post-turn status derived from fresh records and the budget
    pub report: TaskStatusReport,
}

impl TurnOutcome {
    /// All records in execution order: fresh first, then replayed.
    pub fn all_records(&self) -> impl Iterator<Item = &ExecutionRecord> {
        self.records.iter().chain(self.replayed.iter())
    }
}

/// Runs the extract/validate/dedup/execute pipeline for one model response.
pub struct TurnProcessor<R: CapabilityRegistryPort> {
    coordinator: ExecutionCoordinator<R>,
    budget: Arc<ExecutionBudget>,
}

impl<R: CapabilityRegistryPort> TurnProcessor<R> {
    pub fn new(coordinator: ExecutionCoordinator<R>, budget: Arc<ExecutionBudget>) -> Self {
        Self {
            coordinator,
            budget,
        }
    }

    /// Install a cancellation token on the underlying coordinator so
    /// in-flight capability executions unblock when the task is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.coordinator = self.coordinator.with_cancellation(token);
        self
    }

    pub fn budget(&self) -> &Arc<ExecutionBudget> {
        &self.budget
    }

    pub fn coordinator(&self) -> &ExecutionCoordinator<R> {
        &self.coordinator
    }

    /// Process one model response against the conversation so far.
    pub async fn process(&self, response_text: &str, history: &[TurnMessage]) -> TurnOutcome {
        let extracted = extract(response_text);
        let cleaned = clean_text(response_text, &extracted);
        debug!(commands = extracted.len(), "extracted commands from response");

        // Finished signals are consumed here: the pseudo-action never reaches
        // validation or execution, it only flips the flag.
        let mut finished = false;
        let mut candidates = Vec::new();
        for item in extracted {
            if item.command.finished {
                finished = true;
            }
            if item.command.is_finished_signal() {
                continue;
            }
            candidates.push(item.command);
        }

        let catalog = self.coordinator.registry().catalog();
        let mut invalid = Vec::new();
        let mut valid = Vec::new();
        for command in candidates {
            match validate_command(&command, catalog) {
                Ok(()) => valid.push(command),
                Err(error) => {
                    warn!(action = %command.action, %error, "rejected command");
                    invalid.push((command, error));
                }
            }
        }

        // Dedup resolves per command as the batch advances, so a duplicate
        // later in the same batch replays the record produced moments before.
        let mut filter = DedupFilter::from_history(history);
        let mut records = Vec::new();
        let mut replayed = Vec::new();
        let mut dropped = Vec::new();
        let mut pending = valid.into_iter();
        for command in pending.by_ref() {
            if let Some(prior) = filter.resolve(&command) {
                replayed.push(ExecutionRecord {
                    result: prior.result.clone(),
                    timestamp_ms: prior.timestamp_ms,
                    command,
                });
                continue;
            }
            if self.budget.would_exceed(1) {
                dropped.push(command);
                break;
            }
            let result = self.coordinator.execute(&command).await;
            self.budget.record(1);
            let record = ExecutionRecord::new(command, result);
            filter.observe(record.clone());
            records.push(record);
        }
        dropped.extend(pending);
        if !replayed.is_empty() {
            info!(replayed = replayed.len(), "answered commands from history");
        }
        if !dropped.is_empty() {
            info!(dropped = dropped.len(), "budget spent, dropped remaining commands");
        }

        let report = resolve_report(&records, &self.budget);
        TurnOutcome {
            records,
            replayed,
            dropped,
            invalid,
            clean_text: cleaned,
            finished,
            report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutionParams;
    use crate::ports::capability::{Capability, CapabilityError, ExecutionContext};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use toolflow_domain::command::TaskStatus;
    use toolflow_domain::tool::{ToolCatalog, ToolDefinition};

    /// Capability that records every invocation and echoes its parameters.
    struct CountingCapability {
        name: String,
        invocations: Arc<Mutex<Vec<HashMap<String, serde_json::Value>>>>,
    }

    #[async_trait]
    impl Capability for CountingCapability {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new(&self.name, "counting capability")
        }

        async fn invoke(
            &self,
            parameters: &HashMap<String, serde_json::Value>,
            _context: &ExecutionContext,
        ) -> Result<serde_json::Value, CapabilityError> {
            self.invocations.lock().unwrap().push(parameters.clone());
            Ok(json!({"echo": parameters.len()}))
        }
    }

    struct TestRegistry {
        catalog: ToolCatalog,
        capabilities: HashMap<String, Arc<dyn Capability>>,
    }

    #[async_trait]
    impl CapabilityRegistryPort for TestRegistry {
        fn catalog(&self) -> &ToolCatalog {
            &self.catalog
        }

        fn get(&self, name: &str) -> Option<Arc<dyn Capability>> {
            self.capabilities.get(name).cloned()
        }
    }

    struct Fixture {
        processor: TurnProcessor<TestRegistry>,
        invocations: Arc<Mutex<Vec<HashMap<String, serde_json::Value>>>>,
    }

    fn fixture(names: &[&str], limit: u32) -> Fixture {
        let invocations = Arc::new(Mutex::new(Vec::new()));
        let mut catalog = ToolCatalog::new();
        let mut capabilities: HashMap<String, Arc<dyn Capability>> = HashMap::new();
        for name in names {
            let capability = Arc::new(CountingCapability {
                name: name.to_string(),
                invocations: invocations.clone(),
            });
            catalog = catalog.register(capability.definition());
            capabilities.insert(name.to_string(), capability);
        }
        let registry = Arc::new(TestRegistry {
            catalog,
            capabilities,
        });
        let coordinator = ExecutionCoordinator::new(registry, ExecutionParams::default());
        Fixture {
            processor: TurnProcessor::new(coordinator, Arc::new(ExecutionBudget::new(limit))),
            invocations,
        }
    }

    fn command_json(action: &str, path: &str) -> String {
        format!(r#"{{"action": "{action}", "parameters": {{"path": "{path}"}}}}"#)
    }

    #[tokio::test]
    async fn test_budget_caps_batch_and_drops_rest() {
        let fx = fixture(&["read_file"], 3);
        let text: String = (0..5).map(|i| command_json("read_file", &format!("f{i}"))).collect();

        let outcome = fx.processor.process(&text, &[]).await;
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.dropped.len(), 2);
        assert_eq!(fx.invocations.lock().unwrap().len(), 3);
        assert_eq!(outcome.report.status, TaskStatus::LimitReached);
        assert_eq!(outcome.report.tool_execution_count, 3);
        assert!(!outcome.report.can_continue);
    }

    #[tokio::test]
    async fn test_duplicate_from_history_is_not_executed() {
        let fx = fixture(&["read_file"], 10);

        // First turn executes the command.
        let text = command_json("read_file", "a.txt");
        let first = fx.processor.process(&text, &[]).await;
        assert_eq!(first.records.len(), 1);

        // Same command with the same request id arrives again next turn.
        let history = vec![
            TurnMessage::user("read it"),
            TurnMessage::assistant("done").with_tool_records(first.records.clone()),
        ];
        let replay_text = serde_json::to_string(&first.records[0].command).unwrap();
        let second = fx.processor.process(&replay_text, &history).await;

        assert!(second.records.is_empty());
        assert_eq!(second.replayed.len(), 1);
        assert_eq!(fx.invocations.lock().unwrap().len(), 1);
        assert_eq!(fx.processor.budget().executed(), 1);
    }

    #[tokio::test]
    async fn test_replay_only_turn_completes() {
        let fx = fixture(&["read_file"], 1);
        let text = command_json("read_file", "a.txt");
        let first = fx.processor.process(&text, &[]).await;
        assert_eq!(first.report.status, TaskStatus::LimitReached);

        // A replayed turn executes nothing fresh, and only fresh executions
        // count toward status, so the task is complete despite the spent
        // budget.
        let history = vec![TurnMessage::assistant("done").with_tool_records(first.records.clone())];
        let replay_text = serde_json::to_string(&first.records[0].command).unwrap();
        let second = fx.processor.process(&replay_text, &history).await;
        assert!(second.records.is_empty());
        assert_eq!(second.replayed.len(), 1);
        assert_eq!(second.report.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_unknown_action_rejected_not_executed() {
        let fx = fixture(&["read_file"], 10);
        let text = command_json("delete_everything", "x");
        let outcome = fx.processor.process(&text, &[]).await;

        assert!(outcome.records.is_empty());
        assert_eq!(outcome.invalid.len(), 1);
        assert_eq!(
            outcome.invalid[0].1,
            ValidationError::UnknownAction("delete_everything".to_string())
        );
        assert!(fx.invocations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_finished_signal_consumed_before_validation() {
        let fx = fixture(&["read_file"], 10);
        let text = r#"{"action": "finished", "parameters": {}}"#;
        let outcome = fx.processor.process(text, &[]).await;

        assert!(outcome.finished);
        assert!(outcome.invalid.is_empty());
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.report.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_clean_text_strips_command_json() {
        let fx = fixture(&["read_file"], 10);
        let text = format!("Reading now.\n{}\nDone.", command_json("read_file", "a.txt"));
        let outcome = fx.processor.process(&text, &[]).await;
        assert_eq!(outcome.clean_text, "Reading now.\n\nDone.");
    }

    #[tokio::test]
    async fn test_prose_only_turn_completes_with_no_records() {
        let fx = fixture(&["read_file"], 10);
        let outcome = fx.processor.process("Nothing to do here.", &[]).await;
        assert!(outcome.records.is_empty());
        assert!(!outcome.finished);
        assert_eq!(outcome.report.status, TaskStatus::Completed);
        assert_eq!(outcome.clean_text, "Nothing to do here.");
    }

    #[tokio::test]
    async fn test_in_batch_duplicate_replays() {
        let fx = fixture(&["read_file"], 10);
        // Extraction assigns distinct request ids per occurrence, so two
        // identical fragments would both run. Pin the id to force a duplicate.
        let pinned = r#"{"action": "read_file", "parameters": {"path": "a.txt"}, "requestId": "r1"}"#;
        let text = format!("{pinned}{pinned}");
        let outcome = fx.processor.process(&text, &[]).await;
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.replayed.len(), 1);
    }
}
