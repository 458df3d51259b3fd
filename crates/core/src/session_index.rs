// crates/core/src/session_index.rs
//! Parser for per-project `sessions-index.json` manifests.
//!
//! Two manifest generations exist on disk: a flat JSON array of entries, and
//! a versioned `{ "version": _, "entries": [...] }` wrapper. Field names also
//! drifted between camelCase and snake_case over time, so every field is
//! resolved through an ordered candidate-key list.
//!
//! Validation is per entry: one bad entry produces one error string and its
//! siblings keep processing. Only a missing file is a clean empty state.

use chrono::DateTime;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use claude_scope_types::SessionRecord;

/// Manifest file name inside a project directory.
pub const SESSIONS_INDEX_FILE: &str = "sessions-index.json";

/// Maximum stored length of a first prompt, in characters.
pub const MAX_FIRST_PROMPT_LEN: usize = 500;

/// Candidate keys per field, camelCase first, snake_case fallback.
const ID_KEYS: &[&str] = &["id", "sessionId", "session_id"];
const CREATED_KEYS: &[&str] = &["created", "createdAt", "created_at"];
const MODIFIED_KEYS: &[&str] = &["modified", "modifiedAt", "modified_at"];
const MESSAGE_COUNT_KEYS: &[&str] = &["messageCount", "message_count"];
const SUMMARY_KEYS: &[&str] = &["summary"];
const FIRST_PROMPT_KEYS: &[&str] = &["firstPrompt", "first_prompt"];
const GIT_BRANCH_KEYS: &[&str] = &["gitBranch", "git_branch"];

/// Result of parsing one manifest: normalized sessions plus per-entry errors.
#[derive(Debug, Default)]
pub struct IndexOutcome {
    pub sessions: Vec<SessionRecord>,
    pub errors: Vec<String>,
}

/// Parse the manifest at `index_path`, attributing sessions to `project_path`.
///
/// An absent manifest yields zero sessions and zero errors. Unreadable or
/// malformed JSON yields one error. Each invalid entry yields one error and
/// skips only that entry.
pub fn parse_session_index(index_path: &Path, project_path: &str) -> IndexOutcome {
    let mut outcome = IndexOutcome::default();

    let contents = match std::fs::read_to_string(index_path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No manifest at {:?}", index_path);
            return outcome;
        }
        Err(e) => {
            outcome
                .errors
                .push(format!("failed to read {}: {}", index_path.display(), e));
            return outcome;
        }
    };

    let root: Value = match serde_json::from_str(&contents) {
        Ok(v) => v,
        Err(e) => {
            outcome
                .errors
                .push(format!("malformed JSON in {}: {}", index_path.display(), e));
            return outcome;
        }
    };

    // Shape recognition: flat array, or versioned { version, entries } wrapper.
    let entries: &Vec<Value> = match &root {
        Value::Array(arr) => arr,
        Value::Object(obj) => match obj.get("entries").and_then(|e| e.as_array()) {
            Some(arr) => arr,
            None => {
                outcome.errors.push(format!(
                    "unrecognized manifest shape in {}: expected array or {{version, entries}}",
                    index_path.display()
                ));
                return outcome;
            }
        },
        _ => {
            outcome.errors.push(format!(
                "unrecognized manifest shape in {}: expected array or {{version, entries}}",
                index_path.display()
            ));
            return outcome;
        }
    };

    for (i, entry) in entries.iter().enumerate() {
        match normalize_entry(entry, project_path) {
            Ok(session) => outcome.sessions.push(session),
            Err(reason) => outcome.errors.push(format!(
                "entry {} in {}: {}",
                i,
                index_path.display(),
                reason
            )),
        }
    }

    outcome
}

/// Resolve a field through its ordered candidate-key list.
fn field<'a>(entry: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| entry.get(*k))
}

/// Accept RFC 3339 strings or integer epoch milliseconds.
pub(crate) fn parse_timestamp_ms(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|d| d.timestamp_millis()),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

fn opt_string(entry: &Value, keys: &[&str]) -> Option<String> {
    field(entry, keys)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Character-boundary-safe truncation of a first prompt.
pub(crate) fn truncate_first_prompt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}

/// Validate one manifest entry and normalize it to a `SessionRecord`.
fn normalize_entry(entry: &Value, project_path: &str) -> Result<SessionRecord, String> {
    if !entry.is_object() {
        return Err("not an object".to_string());
    }

    let id = field(entry, ID_KEYS)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or("missing id")?
        .to_string();

    let created = field(entry, CREATED_KEYS)
        .ok_or("missing created timestamp")
        .and_then(|v| parse_timestamp_ms(v).ok_or("invalid created timestamp"))?;

    let modified = field(entry, MODIFIED_KEYS)
        .ok_or("missing modified timestamp")
        .and_then(|v| parse_timestamp_ms(v).ok_or("invalid modified timestamp"))?;

    let message_count = field(entry, MESSAGE_COUNT_KEYS)
        .and_then(|v| v.as_i64())
        .unwrap_or(0);

    Ok(SessionRecord {
        id,
        project_path: project_path.to_string(),
        created,
        modified,
        // Out-of-order source timestamps clamp to zero rather than store a
        // negative duration.
        duration_ms: (modified - created).max(0),
        message_count,
        summary: opt_string(entry, SUMMARY_KEYS),
        first_prompt: opt_string(entry, FIRST_PROMPT_KEYS)
            .map(|p| truncate_first_prompt(&p, MAX_FIRST_PROMPT_LEN)),
        git_branch: opt_string(entry, GIT_BRANCH_KEYS),
    })
}
