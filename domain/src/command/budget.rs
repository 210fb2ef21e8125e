//! Execution budget tracking.
//!
//! Counts executed commands against a configured per-task limit. The count
//! is shared across the turn processor and the continuation driver, so the
//! interior is a `Mutex` and all methods take `&self`. A temporary allowance
//! can raise the effective limit for the remainder of the task without
//! touching the configured value.

use std::sync::Mutex;

#[derive(Debug, Default)]
struct BudgetInner {
    executed: u32,
    temporary_limit: Option<u32>,
}

/// Shared counter of command executions against a limit.
#[derive(Debug)]
pub struct ExecutionBudget {
    configured_limit: u32,
    inner: Mutex<BudgetInner>,
}

impl ExecutionBudget {
    pub fn new(limit: u32) -> Self {
        Self {
            configured_limit: limit,
            inner: Mutex::new(BudgetInner::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BudgetInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The limit currently in force: the temporary allowance when one is
    /// active, the configured limit otherwise.
    pub fn effective_limit(&self) -> u32 {
        let inner = self.lock();
        inner.temporary_limit.unwrap_or(self.configured_limit)
    }

    pub fn executed(&self) -> u32 {
        self.lock().executed
    }

    pub fn remaining(&self) -> u32 {
        let inner = self.lock();
        let limit = inner.temporary_limit.unwrap_or(self.configured_limit);
        limit.saturating_sub(inner.executed)
    }

    /// Whether executing `count` more commands would exceed the limit.
    pub fn would_exceed(&self, count: u32) -> bool {
        let inner = self.lock();
        let limit = inner.temporary_limit.unwrap_or(self.configured_limit);
        inner.executed + count > limit
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Record `count` executed commands.
    pub fn record(&self, count: u32) {
        self.lock().executed += count;
    }

    /// Grant `extra` more executions on top of the current effective limit.
    /// The grant persists until [`reset`](Self::reset).
    pub fn add_temporary_allowance(&self, extra: u32) {
        let mut inner = self.lock();
        let current = inner.temporary_limit.unwrap_or(self.configured_limit);
        inner.temporary_limit = Some(current + extra);
    }

    /// Clear the count and any temporary allowance, returning to the
    /// configured limit.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.executed = 0;
        inner.temporary_limit = None;
    }
}
