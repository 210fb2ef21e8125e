//! Command domain — extraction, validation, deduplication, budgeting, and
//! status resolution for model-issued tool invocations.

pub mod budget;
pub mod dedup;
pub mod entities;
pub mod extractor;
pub mod status;
pub mod typed;
pub mod validator;
pub mod value_objects;

pub use budget::ExecutionBudget;
pub use dedup::DedupFilter;
pub use entities::{
    Command, CommandSignature, ExecutionRecord, FINISHED_ACTION, THOUGHT_ACTION,
    USER_FEEDBACK_ACTION,
};
pub use extractor::{ExtractedCommand, clean_text, extract};
pub use status::{TaskStatus, TaskStatusReport, resolve_report, resolve_status};
pub use typed::KnownArgs;
pub use validator::{ValidationError, is_valid, validate_candidate, validate_command};
pub use value_objects::CommandResult;
