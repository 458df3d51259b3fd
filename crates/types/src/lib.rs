// crates/types/src/lib.rs
//! Shared record types exchanged between the parsing core, the cache store,
//! and consuming layers. Plain data only — no I/O, no business logic.

use serde::{Deserialize, Serialize};

/// One row per distinct project path in the cache store.
///
/// Aggregates (`session_count`, `message_count`, `first_activity`,
/// `last_activity`) are recomputed from owned sessions on every sync.
/// `group_name`, `hidden`, and `merged_into` are pass-through UI attributes:
/// the sync pipeline never computes them and upserts never overwrite them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    /// Decoded filesystem path. Unique key.
    pub path: String,
    /// Final path segment, for display.
    pub display_name: String,
    /// Min `created` over owned sessions (epoch ms). `None` when no sessions.
    pub first_activity: Option<i64>,
    /// Max `modified` over owned sessions (epoch ms). `None` when no sessions.
    pub last_activity: Option<i64>,
    pub session_count: i64,
    pub message_count: i64,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub merged_into: Option<String>,
}

impl ProjectRecord {
    /// A fresh record with zeroed aggregates and default UI attributes.
    pub fn new(path: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            display_name: display_name.into(),
            first_activity: None,
            last_activity: None,
            session_count: 0,
            message_count: 0,
            group_name: None,
            hidden: false,
            merged_into: None,
        }
    }
}

/// One row per session in the cache store.
///
/// `id` is derived from the source file name stem and is the unique key.
/// `duration_ms` is always `modified - created`, clamped to zero when the
/// source timestamps are out of order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    /// Decoded path of the owning project.
    pub project_path: String,
    /// Epoch milliseconds.
    pub created: i64,
    /// Epoch milliseconds. Always >= `created` in well-formed sources.
    pub modified: i64,
    pub duration_ms: i64,
    pub message_count: i64,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub first_prompt: Option<String>,
    #[serde(default)]
    pub git_branch: Option<String>,
}

/// Who produced a conversation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    /// Any record type that is neither `user` nor `assistant`.
    #[serde(other)]
    Other,
}

/// One timestamped log record, reduced to what time-split classification
/// needs. Transient — never persisted individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedMessage {
    pub role: MessageRole,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

/// Human/assistant/idle time attribution over one session (or, after
/// aggregation, over many). All durations are milliseconds.
///
/// Aggregation is associative: sum the counters, then recompute the
/// percentages from the summed totals. Never average per-session
/// percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSplit {
    /// `human_ms + claude_ms`.
    pub active_ms: i64,
    pub human_ms: i64,
    pub claude_ms: i64,
    pub idle_ms: i64,
    /// Integer-rounded share of `active_ms`. 0 when `active_ms` is 0.
    pub human_percentage: u32,
    pub claude_percentage: u32,
    /// Adjacent message pairs that contributed to active time.
    pub message_pair_count: u64,
    /// Adjacent message pairs whose gap exceeded the idle threshold.
    pub gap_count: u64,
}

/// Result of one full sync pass. Partial data plus accumulated errors —
/// never an exception for input-data conditions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// False when the configured root directory does not exist. All other
    /// fields are empty in that case.
    pub root_found: bool,
    pub projects: Vec<ProjectRecord>,
    pub sessions: Vec<SessionRecord>,
    pub errors: Vec<String>,
}

/// Status probe: whether a root was found plus current store counts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatus {
    pub root_found: bool,
    pub project_count: i64,
    pub session_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_record_new_defaults() {
        let p = ProjectRecord::new("/home/user/proj", "proj");
        assert_eq!(p.session_count, 0);
        assert_eq!(p.first_activity, None);
        assert!(!p.hidden);
        assert!(p.group_name.is_none());
    }

    #[test]
    fn test_message_role_deserialize_other() {
        let role: MessageRole = serde_json::from_str("\"summary\"").unwrap();
        assert_eq!(role, MessageRole::Other);
        let role: MessageRole = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, MessageRole::User);
    }

    #[test]
    fn test_session_record_camel_case_wire_format() {
        let s = SessionRecord {
            id: "abc".into(),
            project_path: "/p".into(),
            created: 1,
            modified: 2,
            duration_ms: 1,
            message_count: 3,
            summary: None,
            first_prompt: Some("hi".into()),
            git_branch: None,
        };
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"projectPath\""));
        assert!(json.contains("\"firstPrompt\""));
        assert!(json.contains("\"durationMs\""));
    }
}
