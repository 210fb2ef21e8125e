//! History-aware command deduplication.
//!
//! Models re-emit commands they have already issued, especially after being
//! shown their own previous output. Re-running those wastes budget and can
//! repeat side effects, so the filter replays the stored result instead: a
//! command whose [`signature`](crate::command::entities::Command::signature)
//! matches a prior record is answered from history without touching the
//! executor.

use crate::command::entities::{Command, CommandSignature, ExecutionRecord};
use crate::session::{Role, TurnMessage};
use std::collections::HashMap;

/// Index of previously executed commands, built from conversation history.
#[derive(Debug, Default)]
pub struct DedupFilter {
    seen: HashMap<CommandSignature, ExecutionRecord>,
}

impl DedupFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every execution record attached to assistant turns. Later
    /// records win when signatures collide, so replays return the most
    /// recent result.
    pub fn from_history(history: &[TurnMessage]) -> Self {
        let mut filter = Self::new();
        for message in history {
            if message.role != Role::Assistant {
                continue;
            }
            for record in &message.tool_records {
                filter.observe(record.clone());
            }
        }
        filter
    }

    pub fn observe(&mut self, record: ExecutionRecord) {
        self.seen.insert(record.command.signature(), record);
    }

    /// Look up a prior record matching this command, if any.
    pub fn resolve(&self, command: &Command) -> Option<&ExecutionRecord> {
        self.seen.get(&command.signature())
    }

    pub fn is_duplicate(&self, command: &Command) -> bool {
        self.seen.contains_key(&command.signature())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
