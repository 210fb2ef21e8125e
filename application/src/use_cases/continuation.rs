//! Continuation driving.
//!
//! Owns the outer loop: send the task to the model, process each response
//! turn, feed the tool results back, and stop on a finish signal, a pending
//! feedback request, a spent budget, or a turn that executed nothing. A
//! `LimitReached` outcome is resumable: the caller can grant more budget and
//! pick the conversation back up where it stopped.

use crate::ports::capability::CapabilityRegistryPort;
use crate::ports::model_gateway::{GatewayError, ModelGateway, ModelSession};
use crate::use_cases::process_turn::{TurnOutcome, TurnProcessor};
use crate::use_cases::shared::check_cancelled;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use toolflow_domain::command::{ExecutionRecord, TaskStatus};
use toolflow_domain::session::TurnMessage;
use tracing::{debug, info};

/// Errors that abort the drive loop outright.
#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("task was cancelled")]
    Cancelled,
}

/// Where the loop stopped and what it accumulated along the way.
#[derive(Debug)]
pub struct ContinuationOutcome {
    pub status: TaskStatus,
    pub history: Vec<TurnMessage>,
    pub total_executed: u32,
    pub finished: bool,
}

impl ContinuationOutcome {
    /// Whether [`resume`](ContinuationDriver::resume) can pick this task
    /// back up: paused on a feedback request or a spent budget, and the
    /// model never signalled it was done.
    pub fn is_resumable(&self) -> bool {
        !self.finished
            && matches!(
                self.status,
                TaskStatus::WaitingForUser | TaskStatus::LimitReached
            )
    }
}

/// Drives the model/tool loop for a task until it settles.
pub struct ContinuationDriver<G: ModelGateway, R: CapabilityRegistryPort> {
    gateway: Arc<G>,
    processor: TurnProcessor<R>,
    system_prompt: String,
    cancellation_token: Option<CancellationToken>,
}

impl<G: ModelGateway, R: CapabilityRegistryPort> ContinuationDriver<G, R> {
    pub fn new(gateway: Arc<G>, processor: TurnProcessor<R>, system_prompt: impl Into<String>) -> Self {
        Self {
            gateway,
            processor,
            system_prompt: system_prompt.into(),
            cancellation_token: None,
        }
    }

    /// Share one cancellation token across the model wait and all tool
    /// executions: triggering it unblocks an in-flight capability through
    /// the coordinator as well as the loop itself.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.processor = self.processor.with_cancellation(token.clone());
        self.cancellation_token = Some(token);
        self
    }

    /// Run a fresh task to a settled state. Resets the budget first.
    pub async fn run(&self, task: &str) -> Result<ContinuationOutcome, DriveError> {
        self.processor.budget().reset();
        let history = vec![TurnMessage::user(task)];
        self.drive(history, task.to_string()).await
    }

    /// Resume a task that stopped at `limit_reached` or `waiting_for_user`.
    ///
    /// `additional_budget` of zero resets the count back to the configured
    /// limit; a positive value extends the effective limit by that much and
    /// keeps the count.
    pub async fn resume(
        &self,
        history: Vec<TurnMessage>,
        prompt: &str,
        additional_budget: u32,
    ) -> Result<ContinuationOutcome, DriveError> {
        if additional_budget == 0 {
            self.processor.budget().reset();
        } else {
            self.processor.budget().add_temporary_allowance(additional_budget);
        }
        let mut history = history;
        history.push(TurnMessage::user(prompt));
        self.drive(history, prompt.to_string()).await
    }

    async fn drive(
        &self,
        mut history: Vec<TurnMessage>,
        first_prompt: String,
    ) -> Result<ContinuationOutcome, DriveError> {
        let mut session = self.gateway.create_session(&self.system_prompt).await?;
        let mut prompt = first_prompt;
        let mut finished = false;

        let status = loop {
            check_cancelled(&self.cancellation_token)?;

            let response = self.send(session.as_mut(), &prompt).await?;
            let outcome = self.processor.process(&response, &history).await;
            debug!(
                executed = outcome.records.len(),
                replayed = outcome.replayed.len(),
                status = %outcome.report.status,
                "turn processed"
            );

            let records: Vec<ExecutionRecord> = outcome.all_records().cloned().collect();
            history.push(TurnMessage::assistant(outcome.clean_text.clone()).with_tool_records(records));

            if outcome.finished {
                finished = true;
                break TaskStatus::Completed;
            }
            match outcome.report.status {
                TaskStatus::Running => prompt = format_results_digest(&outcome),
                settled => break settled,
            }
        };

        info!(%status, executed = self.processor.budget().executed(), "drive loop settled");
        Ok(ContinuationOutcome {
            status,
            history,
            total_executed: self.processor.budget().executed(),
            finished,
        })
    }

    async fn send(
        &self,
        session: &mut dyn ModelSession,
        prompt: &str,
    ) -> Result<String, DriveError> {
        check_cancelled(&self.cancellation_token)?;
        Ok(session.send(prompt).await?)
    }
}

/// Render a turn's tool results as the next prompt for the model.
fn format_results_digest(outcome: &TurnOutcome) -> String {
    let mut digest = String::from("Tool results:\n");
    for record in outcome.all_records() {
        let line = match (&record.result.data, &record.result.error) {
            (Some(data), _) if record.result.success => {
                format!("- {} [{}]: {}\n", record.command.action, record.command.request_id, data)
            }
            (_, Some(error)) => {
                format!("- {} [{}] failed: {}\n", record.command.action, record.command.request_id, error)
            }
            _ => format!("- {} [{}]: done\n", record.command.action, record.command.request_id),
        };
        digest.push_str(&line);
    }
    if !outcome.dropped.is_empty() {
        digest.push_str(&format!(
            "({} commands were not executed: budget exhausted)\n",
            outcome.dropped.len()
        ));
    }
    digest.push_str("Continue with the task, or reply with a finished signal if done.");
    digest
}
