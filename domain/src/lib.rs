//! Domain layer for toolflow.
//!
//! Pure business logic with no I/O: command extraction from model text,
//! validation against the tool catalog, deduplication over history, budget
//! accounting, and task status resolution. Depends only on serde for wire
//! shapes.

pub mod command;
pub mod core;
pub mod session;
pub mod tool;

pub use command::{
    Command, CommandResult, DedupFilter, ExecutionBudget, ExecutionRecord, ExtractedCommand,
    TaskStatus, TaskStatusReport,
};
pub use session::{Role, TurnMessage};
pub use tool::{ToolCatalog, ToolDefinition, ToolParameter};
