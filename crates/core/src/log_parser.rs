// crates/core/src/log_parser.rs
//! Streaming fallback parser for raw `.jsonl` conversation logs.
//!
//! Used only when a project has no `sessions-index.json`. Each log file is
//! one session: newline-delimited JSON records, streamed line by line so
//! memory stays bounded regardless of file size. A malformed line is skipped
//! without aborting the file.

use crate::error::LogParseError;
use crate::session_index::{parse_timestamp_ms, truncate_first_prompt, MAX_FIRST_PROMPT_LEN};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use claude_scope_types::{MessageRole, ParsedMessage, SessionRecord};

/// One fully parsed session log: the normalized record plus the ordered
/// `(role, timestamp)` pairs that feed time-split computation.
#[derive(Debug)]
pub struct ParsedSessionLog {
    pub session: SessionRecord,
    pub messages: Vec<ParsedMessage>,
}

/// List the raw session log files (`*.jsonl`) in a project directory,
/// ordered by file name.
pub async fn list_session_logs(project_dir: &Path) -> Result<Vec<PathBuf>, LogParseError> {
    let mut entries = fs::read_dir(project_dir)
        .await
        .map_err(|e| LogParseError::io(project_dir, e))?;

    let mut logs = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| LogParseError::io(project_dir, e))?
    {
        let path = entry.path();
        if path.extension().map(|e| e != "jsonl").unwrap_or(true) {
            continue;
        }
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        if is_file {
            logs.push(path);
        }
    }

    logs.sort();
    Ok(logs)
}

/// Parse one session log into metadata and time-split input.
///
/// - `created`/`modified` are the min/max timestamp across valid records;
///   when no record carries a parseable timestamp, both fall back to the
///   file's own modification time.
/// - The session id is the file name stem.
/// - `message_count` counts every valid JSON record examined, of any type.
/// - A `summary`-typed record supplies the session summary; the first `user`
///   record's first text block becomes the first prompt (truncated to 500
///   characters); the first non-empty `gitBranch` wins.
///
/// # Errors
/// Only whole-file conditions (missing file, unreadable file). Malformed
/// lines are skipped with a debug log.
pub async fn parse_session_log(
    file_path: &Path,
    project_path: &str,
) -> Result<ParsedSessionLog, LogParseError> {
    let file = fs::File::open(file_path)
        .await
        .map_err(|e| LogParseError::io(file_path, e))?;

    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let mut message_count: i64 = 0;
    let mut min_ts: Option<i64> = None;
    let mut max_ts: Option<i64> = None;
    let mut summary: Option<String> = None;
    let mut first_prompt: Option<String> = None;
    let mut git_branch: Option<String> = None;
    let mut messages: Vec<ParsedMessage> = Vec::new();
    let mut line_number: usize = 0;

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| LogParseError::io(file_path, e))?
    {
        line_number += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                debug!(
                    "Skipping malformed JSON at line {} in {:?}: {}",
                    line_number, file_path, e
                );
                continue;
            }
        };

        message_count += 1;

        let timestamp = record.get("timestamp").and_then(parse_timestamp_ms);
        if let Some(ts) = timestamp {
            min_ts = Some(min_ts.map_or(ts, |m| m.min(ts)));
            max_ts = Some(max_ts.map_or(ts, |m| m.max(ts)));
        }

        if git_branch.is_none() {
            git_branch = record
                .get("gitBranch")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(String::from);
        }

        match record.get("type").and_then(|t| t.as_str()) {
            Some("summary") => {
                if let Some(s) = record.get("summary").and_then(|v| v.as_str()) {
                    summary = Some(s.to_string());
                }
            }
            Some("user") => {
                if first_prompt.is_none() {
                    if let Some(text) = first_text_block(&record) {
                        first_prompt =
                            Some(truncate_first_prompt(&text, MAX_FIRST_PROMPT_LEN));
                    }
                }
                if let Some(ts) = timestamp {
                    messages.push(ParsedMessage {
                        role: MessageRole::User,
                        timestamp: ts,
                    });
                }
            }
            Some("assistant") => {
                if let Some(ts) = timestamp {
                    messages.push(ParsedMessage {
                        role: MessageRole::Assistant,
                        timestamp: ts,
                    });
                }
            }
            _ => {
                // Unknown record types still count toward message_count but
                // carry no role we classify.
            }
        }
    }

    // No parseable timestamp anywhere: fall back to the file's own mtime.
    let (created, modified) = match (min_ts, max_ts) {
        (Some(min), Some(max)) => (min, max),
        _ => {
            let mtime = file_mtime_ms(file_path).await;
            (mtime, mtime)
        }
    };

    let session_id = file_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(ParsedSessionLog {
        session: SessionRecord {
            id: session_id,
            project_path: project_path.to_string(),
            created,
            modified,
            duration_ms: (modified - created).max(0),
            message_count,
            summary,
            first_prompt,
            git_branch,
        },
        messages,
    })
}

/// Extract the first `text` block from a record's `message.content` array.
/// String-shaped content (older logs) is accepted as-is.
fn first_text_block(record: &Value) -> Option<String> {
    let content = record.get("message")?.get("content")?;
    match content {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(blocks) => blocks.iter().find_map(|b| {
            if b.get("type").and_then(|t| t.as_str()) == Some("text") {
                b.get("text")
                    .and_then(|t| t.as_str())
                    .filter(|s| !s.trim().is_empty())
                    .map(String::from)
            } else {
                None
            }
        }),
        _ => None,
    }
}

async fn file_mtime_ms(path: &Path) -> i64 {
    fs::metadata(path)
        .await
        .ok()
        .and_then(|m| m.modified().ok())
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    async fn write_log(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_parse_basic_session() {
        let dir = TempDir::new().unwrap();
        let content = concat!(
            r#"{"type":"summary","summary":"Fixing the parser"}"#, "\n",
            r#"{"type":"user","timestamp":"2026-01-27T10:00:00Z","message":{"content":[{"type":"text","text":"Please fix the bug"}]},"gitBranch":"main"}"#, "\n",
            r#"{"type":"assistant","timestamp":"2026-01-27T10:00:30Z","message":{"content":[{"type":"text","text":"Done"}]}}"#, "\n",
        );
        let path = write_log(&dir, "abc-123.jsonl", content).await;

        let parsed = parse_session_log(&path, "/home/u/proj").await.unwrap();
        let s = &parsed.session;

        assert_eq!(s.id, "abc-123");
        assert_eq!(s.project_path, "/home/u/proj");
        assert_eq!(s.message_count, 3);
        assert_eq!(s.summary.as_deref(), Some("Fixing the parser"));
        assert_eq!(s.first_prompt.as_deref(), Some("Please fix the bug"));
        assert_eq!(s.git_branch.as_deref(), Some("main"));
        assert_eq!(s.duration_ms, 30_000);
        assert_eq!(s.modified - s.created, 30_000);

        assert_eq!(parsed.messages.len(), 2);
        assert_eq!(parsed.messages[0].role, MessageRole::User);
        assert_eq!(parsed.messages[1].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_malformed_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let content = concat!(
            r#"{"type":"user","timestamp":"2026-01-27T10:00:00Z","message":{"content":[{"type":"text","text":"hi"}]}}"#, "\n",
            "this is not json at all\n",
            "{\"unterminated\": \n",
            r#"{"type":"assistant","timestamp":"2026-01-27T10:01:00Z"}"#, "\n",
        );
        let path = write_log(&dir, "s.jsonl", content).await;

        let parsed = parse_session_log(&path, "/p").await.unwrap();
        // Only the two valid records are counted.
        assert_eq!(parsed.session.message_count, 2);
        assert_eq!(parsed.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_mtime_fallback_when_no_timestamps() {
        let dir = TempDir::new().unwrap();
        let content = r#"{"type":"user","message":{"content":[{"type":"text","text":"no timestamp here"}]}}"#;
        let path = write_log(&dir, "s.jsonl", content).await;

        let parsed = parse_session_log(&path, "/p").await.unwrap();
        assert!(parsed.session.created > 0, "should fall back to file mtime");
        assert_eq!(parsed.session.created, parsed.session.modified);
        assert_eq!(parsed.session.duration_ms, 0);
        // The record is valid, so it still counts.
        assert_eq!(parsed.session.message_count, 1);
        // No timestamp means no time-split input.
        assert!(parsed.messages.is_empty());
    }

    #[tokio::test]
    async fn test_first_prompt_truncated_to_limit() {
        let dir = TempDir::new().unwrap();
        let long_prompt = "a".repeat(2000);
        let content = format!(
            r#"{{"type":"user","timestamp":"2026-01-27T10:00:00Z","message":{{"content":[{{"type":"text","text":"{}"}}]}}}}"#,
            long_prompt
        );
        let path = write_log(&dir, "s.jsonl", &content).await;

        let parsed = parse_session_log(&path, "/p").await.unwrap();
        assert_eq!(
            parsed.session.first_prompt.unwrap().len(),
            MAX_FIRST_PROMPT_LEN
        );
    }

    #[tokio::test]
    async fn test_string_content_accepted() {
        let dir = TempDir::new().unwrap();
        let content = r#"{"type":"user","timestamp":"2026-01-27T10:00:00Z","message":{"content":"plain string prompt"}}"#;
        let path = write_log(&dir, "s.jsonl", content).await;

        let parsed = parse_session_log(&path, "/p").await.unwrap();
        assert_eq!(
            parsed.session.first_prompt.as_deref(),
            Some("plain string prompt")
        );
    }

    #[tokio::test]
    async fn test_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = write_log(&dir, "empty.jsonl", "").await;

        let parsed = parse_session_log(&path, "/p").await.unwrap();
        assert_eq!(parsed.session.message_count, 0);
        assert!(parsed.messages.is_empty());
        assert!(parsed.session.created > 0, "mtime fallback applies");
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let result = parse_session_log(Path::new("/nonexistent/x.jsonl"), "/p").await;
        assert!(matches!(result, Err(LogParseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_session_logs_filters_extension() {
        let dir = TempDir::new().unwrap();
        write_log(&dir, "a.jsonl", "{}").await;
        write_log(&dir, "b.jsonl", "{}").await;
        write_log(&dir, "notes.txt", "x").await;
        write_log(&dir, "index.json", "{}").await;

        let logs = list_session_logs(dir.path()).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().all(|p| p.extension().unwrap() == "jsonl"));
    }

    #[tokio::test]
    async fn test_min_max_timestamps_out_of_order_lines() {
        let dir = TempDir::new().unwrap();
        let content = concat!(
            r#"{"type":"assistant","timestamp":"2026-01-27T11:00:00Z"}"#, "\n",
            r#"{"type":"user","timestamp":"2026-01-27T10:00:00Z","message":{"content":[{"type":"text","text":"hi"}]}}"#, "\n",
        );
        let path = write_log(&dir, "s.jsonl", content).await;

        let parsed = parse_session_log(&path, "/p").await.unwrap();
        assert_eq!(
            parsed.session.modified - parsed.session.created,
            3_600_000,
            "created/modified are min/max regardless of line order"
        );
    }
}
