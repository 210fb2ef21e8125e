//! Typed views over command parameters.
//!
//! Capabilities mostly work from the raw parameter map, but the built-in
//! actions have known shapes; [`KnownArgs::parse`] recovers them for callers
//! that want typed access (argument checking, display). Unrecognized actions
//! fall through to [`KnownArgs::Opaque`] rather than failing, so new
//! capabilities never need a variant here.

use crate::command::entities::Command;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct ReadFileArgs {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WriteFileArgs {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameFileArgs {
    pub path: String,
    pub new_path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilesArgs {
    pub pattern: String,
    #[serde(default)]
    pub file_glob: Option<String>,
    #[serde(default)]
    pub base_dir: Option<String>,
    #[serde(default)]
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThoughtArgs {
    pub thought: String,
    #[serde(default)]
    pub next_tool: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetUserFeedbackArgs {
    pub question: String,
}

/// Typed arguments for the built-in actions, with an escape hatch for
/// everything else.
#[derive(Debug, Clone)]
pub enum KnownArgs {
    ReadFile(ReadFileArgs),
    WriteFile(WriteFileArgs),
    RenameFile(RenameFileArgs),
    SearchFiles(SearchFilesArgs),
    Thought(ThoughtArgs),
    GetUserFeedback(GetUserFeedbackArgs),
    Opaque(HashMap<String, serde_json::Value>),
}

impl KnownArgs {
    /// Parse a command's parameters into the typed shape for its action.
    /// Returns `None` when a known action's parameters fail to deserialize;
    /// unknown actions always succeed as [`KnownArgs::Opaque`].
    pub fn parse(command: &Command) -> Option<Self> {
        fn typed<T: serde::de::DeserializeOwned>(
            params: &HashMap<String, serde_json::Value>,
        ) -> Option<T> {
            let map: serde_json::Map<String, serde_json::Value> = params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            serde_json::from_value(serde_json::Value::Object(map)).ok()
        }

        match command.action.as_str() {
            "read_file" => typed(&command.parameters).map(KnownArgs::ReadFile),
            "write_file" => typed(&command.parameters).map(KnownArgs::WriteFile),
            "rename_file" => typed(&command.parameters).map(KnownArgs::RenameFile),
            "search_files" => typed(&command.parameters).map(KnownArgs::SearchFiles),
            "thought" => typed(&command.parameters).map(KnownArgs::Thought),
            "get_user_feedback" => typed(&command.parameters).map(KnownArgs::GetUserFeedback),
            _ => Some(KnownArgs::Opaque(command.parameters.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_read_file() {
        let cmd = Command::new("read_file").with_arg("path", "a.txt");
        match KnownArgs::parse(&cmd) {
            Some(KnownArgs::ReadFile(args)) => assert_eq!(args.path, "a.txt"),
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_missing_required_field_fails() {
        let cmd = Command::new("write_file").with_arg("path", "a.txt");
        assert!(KnownArgs::parse(&cmd).is_none());
    }

    #[test]
    fn test_rename_uses_camel_case_key() {
        let cmd = Command::new("rename_file")
            .with_arg("path", "a.txt")
            .with_arg("newPath", "b.txt");
        match KnownArgs::parse(&cmd) {
            Some(KnownArgs::RenameFile(args)) => {
                assert_eq!(args.path, "a.txt");
                assert_eq!(args.new_path, "b.txt");
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_search_optional_fields_default() {
        let cmd = Command::new("search_files").with_arg("pattern", "fn main");
        match KnownArgs::parse(&cmd) {
            Some(KnownArgs::SearchFiles(args)) => {
                assert_eq!(args.pattern, "fn main");
                assert!(args.file_glob.is_none());
                assert!(args.max_results.is_none());
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_action_is_opaque() {
        let cmd = Command::new("custom_tool").with_arg("anything", 1);
        match KnownArgs::parse(&cmd) {
            Some(KnownArgs::Opaque(params)) => assert!(params.contains_key("anything")),
            other => panic!("unexpected parse: {other:?}"),
        }
    }
}
