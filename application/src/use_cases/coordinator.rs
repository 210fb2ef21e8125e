//! Execution coordinator.
//!
//! Routes a single validated command to its capability and settles the
//! outcome into a [`CommandResult`], whatever happens: registry miss,
//! capability error, timeout, or cancellation all become failure results
//! rather than bubbling out. Hooks fire around the invocation and are
//! isolated so a panicking observer cannot take down the pipeline.

use crate::config::ExecutionParams;
use crate::ports::capability::{CapabilityRegistryPort, ExecutionContext};
use crate::ports::hooks::{ExecutionHooks, NoHooks};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use toolflow_domain::command::{Command, CommandResult};
use tracing::{debug, warn};

/// Executes commands through the capability registry with timeout and
/// cancellation handling.
pub struct ExecutionCoordinator<R: CapabilityRegistryPort> {
    registry: Arc<R>,
    params: ExecutionParams,
    hooks: Arc<dyn ExecutionHooks>,
    cancellation_token: Option<CancellationToken>,
}

impl<R: CapabilityRegistryPort> ExecutionCoordinator<R> {
    pub fn new(registry: Arc<R>, params: ExecutionParams) -> Self {
        Self {
            registry,
            params,
            hooks: Arc::new(NoHooks),
            cancellation_token: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ExecutionHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn registry(&self) -> &Arc<R> {
        &self.registry
    }

    pub fn params(&self) -> &ExecutionParams {
        &self.params
    }

    /// Execute one command. Always settles into a result; never panics and
    /// never returns early on hook misbehavior. Both hooks fire once the
    /// result settles, display first.
    pub async fn execute(&self, command: &Command) -> CommandResult {
        debug!(action = %command.action, request_id = %command.request_id, "executing command");

        let result = self.execute_inner(command).await;

        self.fire_display(command, &result);
        self.fire_result(command, &result);
        result
    }

    async fn execute_inner(&self, command: &Command) -> CommandResult {
        let Some(capability) = self.registry.get(&command.action) else {
            return CommandResult::failure(
                &command.request_id,
                format!("capability not found: {}", command.action),
            );
        };

        let context = match &self.params.working_dir {
            Some(dir) => ExecutionContext::with_working_dir(dir.clone()),
            None => ExecutionContext::default(),
        };

        let timeout = self.params.tool_timeout;
        let invocation = tokio::time::timeout(
            timeout,
            capability.invoke(&command.parameters, &context),
        );

        let settled = if let Some(token) = &self.cancellation_token {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    return CommandResult::failure(&command.request_id, "cancelled");
                }
                settled = invocation => settled,
            }
        } else {
            invocation.await
        };

        match settled {
            Ok(Ok(data)) => CommandResult::success(&command.request_id, data),
            Ok(Err(error)) => CommandResult::failure(&command.request_id, error.to_string()),
            Err(_) => CommandResult::failure(
                &command.request_id,
                format!("timed out after {}ms", timeout.as_millis()),
            ),
        }
    }

    fn fire_display(&self, command: &Command, result: &CommandResult) {
        let hooks = Arc::clone(&self.hooks);
        if catch_unwind(AssertUnwindSafe(|| hooks.on_display(command, result))).is_err() {
            warn!(action = %command.action, "display hook panicked");
        }
    }

    fn fire_result(&self, command: &Command, result: &CommandResult) {
        let hooks = Arc::clone(&self.hooks);
        if catch_unwind(AssertUnwindSafe(|| hooks.on_result(command, result))).is_err() {
            warn!(action = %command.action, "result hook panicked");
        }
    }
}
