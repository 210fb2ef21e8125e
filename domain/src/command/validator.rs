//! Command validation.
//!
//! Two layers: structural checks on the raw JSON candidate, then catalog
//! membership for the action name. Validation never mutates the command and
//! reports the first problem it finds.

use crate::command::entities::Command;
use crate::tool::ToolCatalog;

/// Why a command candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("candidate is not a JSON object")]
    NotAnObject,
    #[error("missing or non-string \"action\" field")]
    MissingAction,
    #[error("\"parameters\" must be a JSON object")]
    BadParameters,
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("action name is empty")]
    EmptyAction,
}

/// Structural validation of a raw JSON candidate, before it becomes a
/// [`Command`].
pub fn validate_candidate(value: &serde_json::Value) -> Result<(), ValidationError> {
    let object = value.as_object().ok_or(ValidationError::NotAnObject)?;
    let action = object
        .get("action")
        .and_then(|a| a.as_str())
        .ok_or(ValidationError::MissingAction)?;
    if action.trim().is_empty() {
        return Err(ValidationError::EmptyAction);
    }
    if let Some(params) = object.get("parameters")
        && !params.is_object()
    {
        return Err(ValidationError::BadParameters);
    }
    Ok(())
}

/// Full validation of an extracted command against the registered catalog.
pub fn validate_command(command: &Command, catalog: &ToolCatalog) -> Result<(), ValidationError> {
    if command.action.trim().is_empty() {
        return Err(ValidationError::EmptyAction);
    }
    if !catalog.contains(&command.action) {
        return Err(ValidationError::UnknownAction(command.action.clone()));
    }
    Ok(())
}

pub fn is_valid(command: &Command, catalog: &ToolCatalog) -> bool {
    validate_command(command, catalog).is_ok()
}
