//! File content search capability.
//!
//! Walks files matched by a glob under the base directory and collects
//! regex matches with line numbers. Results and per-file sizes are capped so
//! a careless pattern cannot flood the model's context.

use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use toolflow_application::ports::capability::{Capability, CapabilityError, ExecutionContext};
use toolflow_domain::core::string::truncate;
use toolflow_domain::tool::{ToolDefinition, ToolParameter};
use tracing::debug;

const DEFAULT_MAX_RESULTS: usize = 50;
const MAX_FILE_BYTES: u64 = 2_097_152;
const MAX_LINE_CHARS: usize = 200;

/// Search file contents by regex.
pub struct SearchFilesCapability;

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchMatch {
    file: String,
    line_number: usize,
    line: String,
}

#[async_trait]
impl Capability for SearchFilesCapability {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("search_files", "Search file contents with a regular expression")
            .with_parameter(ToolParameter::new("pattern", "Regular expression to search for", true))
            .with_parameter(
                ToolParameter::new("fileGlob", "Glob restricting which files to search", false),
            )
            .with_parameter(
                ToolParameter::new("baseDir", "Directory to search under", false).with_type("path"),
            )
            .with_parameter(
                ToolParameter::new("maxResults", "Maximum number of matches to return", false)
                    .with_type("number"),
            )
    }

    async fn invoke(
        &self,
        parameters: &HashMap<String, serde_json::Value>,
        context: &ExecutionContext,
    ) -> Result<serde_json::Value, CapabilityError> {
        let pattern = parameters
            .get("pattern")
            .and_then(|v| v.as_str())
            .ok_or_else(|| CapabilityError::InvalidArgument("missing \"pattern\" argument".to_string()))?;
        let regex = Regex::new(pattern)
            .map_err(|e| CapabilityError::InvalidArgument(format!("bad pattern: {e}")))?;

        let file_glob = parameters
            .get("fileGlob")
            .and_then(|v| v.as_str())
            .unwrap_or("**/*");
        let base_dir = match parameters.get("baseDir").and_then(|v| v.as_str()) {
            Some(dir) => context.resolve(dir),
            None => context
                .working_dir
                .clone()
                .unwrap_or_else(|| std::path::PathBuf::from(".")),
        };
        let max_results = parameters
            .get("maxResults")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_MAX_RESULTS);

        let started = Instant::now();
        let full_glob = base_dir.join(file_glob).display().to_string();
        debug!(%full_glob, pattern, "search_files");

        let mut matches = Vec::new();
        let mut files_scanned = 0usize;
        let entries = glob::glob(&full_glob)
            .map_err(|e| CapabilityError::InvalidArgument(format!("bad glob: {e}")))?;

        'scan: for entry in entries.flatten() {
            if !entry.is_file() || !within_size_limit(&entry) {
                continue;
            }
            let Ok(content) = tokio::fs::read_to_string(&entry).await else {
                continue; // binary or unreadable
            };
            files_scanned += 1;
            for (index, line) in content.lines().enumerate() {
                if regex.is_match(line) {
                    matches.push(SearchMatch {
                        file: entry.display().to_string(),
                        line_number: index + 1,
                        line: truncate(line.trim_end(), MAX_LINE_CHARS),
                    });
                    if matches.len() >= max_results {
                        break 'scan;
                    }
                }
            }
        }

        Ok(serde_json::json!({
            "matchCount": matches.len(),
            "matches": matches,
            "filesScanned": files_scanned,
            "truncated": matches.len() >= max_results,
            "elapsedMs": started.elapsed().as_millis() as u64,
        }))
    }
}

fn within_size_limit(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|m| m.len() <= MAX_FILE_BYTES)
}
