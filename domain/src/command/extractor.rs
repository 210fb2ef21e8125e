//! Command extraction from model response text.
//!
//! Model replies embed tool invocations as JSON in whatever shape the model
//! felt like producing: a single object, an array, several back-to-back
//! objects with no separators, fenced code blocks, or an object buried in
//! prose. [`extract`] recovers every candidate it can, together with the
//! text span each one occupied, so callers can strip the JSON and keep the
//! prose ([`clean_text`]).
//!
//! Strategies are tried in order, stopping at the first whole-text match,
//! then falling back to in-text scanning:
//!
//! 1. Whole text parses as one command object, or an array of them.
//! 2. Whole text parses as a thought object (`thought` + `nextTool`).
//! 3. Brace-balanced scan for consecutive top-level objects.
//! 4. Fenced code blocks (```json or plain), then a bare inline `{...}`.
//!
//! Fragments that fail to parse are treated as prose, never as errors.

use crate::command::entities::{Command, FINISHED_ACTION, THOUGHT_ACTION};
use crate::command::validator::validate_candidate;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::ops::Range;

/// A command together with the byte span of the original text it was
/// extracted from.
#[derive(Debug, Clone)]
pub struct ExtractedCommand {
    pub command: Command,
    pub span: Range<usize>,
}

/// Extract zero or more commands from raw model response text.
///
/// Running this twice on the same text yields identical output: generated
/// request ids are content-derived, and no state is kept between calls.
pub fn extract(text: &str) -> Vec<ExtractedCommand> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    let offset = text.len() - text.trim_start().len();
    let whole_span = offset..offset + trimmed.len();

    // 1. Whole text is a single command object or an array of them
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        match &value {
            serde_json::Value::Object(_) => {
                if let Some(command) = command_from_value(&value) {
                    return assign_request_ids(vec![ExtractedCommand {
                        command,
                        span: whole_span,
                    }]);
                }
                // 2. Whole text is a thought object
                if let Some(command) = thought_from_value(&value) {
                    return assign_request_ids(vec![ExtractedCommand {
                        command,
                        span: whole_span,
                    }]);
                }
            }
            serde_json::Value::Array(items) => {
                let commands: Vec<Command> =
                    items.iter().filter_map(command_from_value).collect();
                if !commands.is_empty() {
                    return assign_request_ids(
                        commands
                            .into_iter()
                            .map(|command| ExtractedCommand {
                                command,
                                span: whole_span.clone(),
                            })
                            .collect(),
                    );
                }
            }
            _ => {}
        }
    }

    // 3. Brace-balanced scan for consecutive objects embedded in prose
    let mut found = Vec::new();
    for (span, fragment) in balanced_objects(text) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(fragment)
            && let Some(command) = command_from_value(&value).or_else(|| thought_from_value(&value))
        {
            found.push(ExtractedCommand { command, span });
        }
    }
    if !found.is_empty() {
        return assign_request_ids(found);
    }

    // 4. Fenced code blocks, then a bare inline object
    let mut found = Vec::new();
    for (span, fragment) in fenced_blocks(text) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(fragment.trim())
            && let Some(command) = command_from_value(&value).or_else(|| thought_from_value(&value))
            && !overlaps_any(&span, &found)
        {
            found.push(ExtractedCommand { command, span });
        }
    }
    if found.is_empty()
        && let Some(start) = text.find('{')
        && let Some(end) = text.rfind('}')
        && start < end
        && let Ok(value) = serde_json::from_str::<serde_json::Value>(&text[start..=end])
        && let Some(command) = command_from_value(&value).or_else(|| thought_from_value(&value))
    {
        found.push(ExtractedCommand {
            command,
            span: start..end + 1,
        });
    }
    assign_request_ids(found)
}

/// Remove the extracted spans from the original text, leaving the prose.
///
/// Spans are merged first, so overlapping or duplicated spans are removed
/// once — the operation is order-independent and idempotent.
pub fn clean_text(text: &str, extracted: &[ExtractedCommand]) -> String {
    let mut ranges: Vec<Range<usize>> = extracted
        .iter()
        .map(|e| e.span.start.min(text.len())..e.span.end.min(text.len()))
        .collect();
    ranges.sort_by_key(|r| (r.start, r.end));

    let mut merged: Vec<Range<usize>> = Vec::new();
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for range in merged {
        out.push_str(&text[cursor..range.start]);
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);
    out.trim().to_string()
}

/// Convert a JSON object with an `action` field into a [`Command`].
///
/// Candidates go through [`validate_candidate`] first, so structurally
/// malformed objects (empty action, non-object `parameters`) are dropped as
/// prose. Objects without an explicit `parameters` wrapper use a copy of the
/// object itself, minus `action` and `requestId`, as the parameters — the
/// model may emit `{"action": "x", "foo": 1}` directly.
fn command_from_value(value: &serde_json::Value) -> Option<Command> {
    validate_candidate(value).ok()?;
    let object = value.as_object()?;
    let action = object.get("action")?.as_str()?.to_string();

    let parameters: HashMap<String, serde_json::Value> = match object.get("parameters") {
        Some(serde_json::Value::Object(map)) => {
            map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
        }
        Some(_) => return None, // present but not an object: malformed
        None => object
            .iter()
            .filter(|(k, _)| k.as_str() != "action" && k.as_str() != "requestId")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    };

    let request_id = object
        .get("requestId")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let finished = action.eq_ignore_ascii_case(FINISHED_ACTION);

    let mut command = Command::new(action).with_request_id(request_id).with_finished(finished);
    command.parameters = parameters;
    Some(command)
}

/// Convert a thought object (`thought` + `nextTool`, no `action`) into a
/// synthetic `thought` command.
fn thought_from_value(value: &serde_json::Value) -> Option<Command> {
    let object = value.as_object()?;
    if object.contains_key("action") {
        return None;
    }
    let thought = object.get("thought")?;
    let next_tool = object.get("nextTool")?;

    let finished = next_tool
        .as_str()
        .is_some_and(|t| t.eq_ignore_ascii_case(FINISHED_ACTION));

    let mut command = Command::new(THOUGHT_ACTION).with_finished(finished);
    command
        .parameters
        .insert("thought".to_string(), thought.clone());
    command
        .parameters
        .insert("nextTool".to_string(), next_tool.clone());
    Some(command)
}

/// Scan text for top-level brace-balanced `{...}` spans.
///
/// Tracks nesting depth and string boundaries: a `{` or `}` inside a quoted
/// string value does not affect depth, and backslash escapes inside strings
/// are honored. Quotes in prose outside any object are ignored.
fn balanced_objects(text: &str) -> Vec<(Range<usize>, &str)> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            '}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        spans.push((start..i + 1, &text[start..=i]));
                    }
                }
            }
            _ => {}
        }
    }
    spans
}

/// Find fenced code blocks (```json or plain ```) and return their inner
/// content with the span of the whole fence.
fn fenced_blocks(text: &str) -> Vec<(Range<usize>, &str)> {
    let mut blocks = Vec::new();
    let mut fence_start: Option<usize> = None;
    let mut content_start = 0usize;
    let mut cursor = 0usize;

    for line in text.split_inclusive('\n') {
        let line_start = cursor;
        cursor += line.len();
        let stripped = line.trim();

        if let Some(open) = fence_start {
            if stripped == "```" {
                blocks.push((open..cursor, &text[content_start..line_start]));
                fence_start = None;
            }
        } else if stripped == "```json" || stripped == "```" {
            fence_start = Some(line_start);
            content_start = cursor;
        }
    }
    blocks
}

fn overlaps_any(span: &Range<usize>, found: &[ExtractedCommand]) -> bool {
    found
        .iter()
        .any(|e| span.start < e.span.end && e.span.start < span.end)
}

/// Fill in missing request ids deterministically from command content and
/// occurrence index, so extraction is idempotent and dedup signatures are
/// stable across turns that re-emit the same command.
fn assign_request_ids(mut extracted: Vec<ExtractedCommand>) -> Vec<ExtractedCommand> {
    for (index, item) in extracted.iter_mut().enumerate() {
        if item.command.request_id.is_empty() {
            let mut hasher = std::hash::DefaultHasher::new();
            item.command.action.hash(&mut hasher);
            item.command.canonical_parameters().hash(&mut hasher);
            index.hash(&mut hasher);
            item.command.request_id = format!("req-{:016x}", hasher.finish());
        }
    }
    extracted
}
