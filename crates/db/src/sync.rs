// crates/db/src/sync.rs
//! Sync orchestrator: discover → parse → aggregate → persist.
//!
//! The only side-effecting component of the pipeline. Walks every discovered
//! project directory, prefers the `sessions-index.json` manifest and falls
//! back to streaming the raw logs, aggregates owned sessions into one
//! project record, and replaces the project's rows in the store. Per-project
//! failures are accumulated as strings, never raised: a sync always returns
//! a report, possibly with partial data.

use crate::{Database, DbResult};
use std::path::Path;
use tracing::{debug, info, warn};

use claude_scope_core::{
    codec, discovery, log_parser, session_index, session_index::SESSIONS_INDEX_FILE,
};
use claude_scope_types::{ProjectRecord, SessionRecord, StoreStatus, SyncReport};

/// Run one full sync pass against `root`.
///
/// A missing root yields `root_found: false` with everything empty — the
/// legitimate first-run state, not an error. All data-level faults end up in
/// `report.errors` alongside whatever records were produced.
pub async fn sync(db: &Database, root: &Path) -> DbResult<SyncReport> {
    let mut report = SyncReport::default();

    if !root.exists() {
        debug!("Session root does not exist: {:?}", root);
        return Ok(report);
    }
    report.root_found = true;

    let dirs = match discovery::discover_project_dirs(root).await {
        Ok(dirs) => dirs,
        Err(e) => {
            report.errors.push(e.to_string());
            return Ok(report);
        }
    };

    for dir in dirs {
        let project_path = codec::decode_project_dir(&dir.encoded_name);

        // Stale or renamed project: the decoded path no longer exists on
        // disk. Expected consequence of external deletion, skipped silently.
        if !project_path.exists() {
            debug!(
                "Skipping {} — decoded path {:?} not on disk",
                dir.encoded_name, project_path
            );
            continue;
        }

        let project_path_str = project_path.to_string_lossy().to_string();
        let (sessions, errors) = collect_project_sessions(&dir.path, &project_path_str).await;
        report.errors.extend(errors);

        let project = aggregate_project(&project_path_str, &project_path, &sessions);

        if let Err(e) = persist_project(db, &project, &sessions).await {
            warn!("Failed to persist project {}: {}", project.path, e);
            report
                .errors
                .push(format!("failed to persist {}: {}", project.path, e));
            continue;
        }

        report.sessions.extend(sessions);
        report.projects.push(project);
    }

    info!(
        "Sync complete: {} projects, {} sessions, {} errors",
        report.projects.len(),
        report.sessions.len(),
        report.errors.len()
    );
    Ok(report)
}

/// Status probe: whether the root exists plus current store counts.
pub async fn status(db: &Database, root: &Path) -> DbResult<StoreStatus> {
    Ok(StoreStatus {
        root_found: root.exists(),
        project_count: db.count_projects().await?,
        session_count: db.count_sessions().await?,
    })
}

/// Parse one project directory: manifest-first, log-stream fallback.
///
/// A present-but-broken manifest does *not* fall through to the logs — the
/// manifest stays the source of truth for that pass and contributes its
/// error.
async fn collect_project_sessions(
    project_dir: &Path,
    project_path: &str,
) -> (Vec<SessionRecord>, Vec<String>) {
    let index_path = project_dir.join(SESSIONS_INDEX_FILE);
    if index_path.exists() {
        let outcome = session_index::parse_session_index(&index_path, project_path);
        return (outcome.sessions, outcome.errors);
    }

    let mut sessions = Vec::new();
    let mut errors = Vec::new();

    let logs = match log_parser::list_session_logs(project_dir).await {
        Ok(logs) => logs,
        Err(e) => {
            errors.push(e.to_string());
            return (sessions, errors);
        }
    };

    for log in logs {
        match log_parser::parse_session_log(&log, project_path).await {
            Ok(parsed) => sessions.push(parsed.session),
            Err(e) => errors.push(e.to_string()),
        }
    }

    (sessions, errors)
}

/// Fold a project's sessions into one record: count, sum, min/max.
fn aggregate_project(
    project_path: &str,
    decoded: &Path,
    sessions: &[SessionRecord],
) -> ProjectRecord {
    let mut project = ProjectRecord::new(project_path, codec::display_name(decoded));
    project.session_count = sessions.len() as i64;
    project.message_count = sessions.iter().map(|s| s.message_count).sum();
    project.first_activity = sessions.iter().map(|s| s.created).min();
    project.last_activity = sessions.iter().map(|s| s.modified).max();
    project
}

/// Upsert the project row, then replace its sessions atomically.
async fn persist_project(
    db: &Database,
    project: &ProjectRecord,
    sessions: &[SessionRecord],
) -> DbResult<()> {
    db.upsert_project(project).await?;
    db.replace_project_sessions(&project.path, sessions).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// A fake session-history root plus a real on-disk project directory, so
    /// decoded paths pass the existence check.
    struct Fixture {
        _workspace: TempDir,
        root: PathBuf,
        project_path: PathBuf,
        encoded_dir: PathBuf,
    }

    fn fixture() -> Fixture {
        let workspace = TempDir::new().unwrap();
        let root = workspace.path().join("projects-root");
        std::fs::create_dir(&root).unwrap();

        let project_path = workspace.path().join("realproj");
        std::fs::create_dir(&project_path).unwrap();

        let encoded = codec::encode_project_path(&project_path);
        let encoded_dir = root.join(&encoded);
        std::fs::create_dir(&encoded_dir).unwrap();

        Fixture {
            _workspace: workspace,
            root,
            project_path,
            encoded_dir,
        }
    }

    #[tokio::test]
    async fn test_missing_root_is_explicit_result() {
        let db = Database::new_in_memory().await.unwrap();
        let report = sync(&db, Path::new("/nonexistent/root/xyz")).await.unwrap();

        assert!(!report.root_found);
        assert!(report.projects.is_empty());
        assert!(report.sessions.is_empty());
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn test_sync_from_manifest() {
        let fx = fixture();
        std::fs::write(
            fx.encoded_dir.join(SESSIONS_INDEX_FILE),
            r#"[
                {"id": "s1", "created": 1000, "modified": 5000, "messageCount": 3},
                {"id": "s2", "created": 2000, "modified": 9000, "messageCount": 4}
            ]"#,
        )
        .unwrap();

        let db = Database::new_in_memory().await.unwrap();
        let report = sync(&db, &fx.root).await.unwrap();

        assert!(report.root_found);
        assert!(report.errors.is_empty());
        assert_eq!(report.projects.len(), 1);
        assert_eq!(report.sessions.len(), 2);

        let project = &report.projects[0];
        assert_eq!(project.path, fx.project_path.to_string_lossy());
        assert_eq!(project.display_name, "realproj");
        assert_eq!(project.session_count, 2);
        assert_eq!(project.message_count, 7);
        assert_eq!(project.first_activity, Some(1000));
        assert_eq!(project.last_activity, Some(9000));

        // Persisted, not just reported.
        assert_eq!(db.count_projects().await.unwrap(), 1);
        assert_eq!(db.count_sessions().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_sync_log_fallback_when_no_manifest() {
        let fx = fixture();
        std::fs::write(
            fx.encoded_dir.join("abc.jsonl"),
            concat!(
                r#"{"type":"user","timestamp":"2026-01-27T10:00:00Z","message":{"content":[{"type":"text","text":"hi"}]}}"#,
                "\n",
                r#"{"type":"assistant","timestamp":"2026-01-27T10:05:00Z"}"#,
                "\n",
            ),
        )
        .unwrap();

        let db = Database::new_in_memory().await.unwrap();
        let report = sync(&db, &fx.root).await.unwrap();

        assert!(report.errors.is_empty());
        assert_eq!(report.sessions.len(), 1);
        assert_eq!(report.sessions[0].id, "abc");
        assert_eq!(report.sessions[0].message_count, 2);
        assert_eq!(report.projects[0].session_count, 1);
    }

    #[tokio::test]
    async fn test_broken_manifest_collects_error_without_log_fallback() {
        let fx = fixture();
        std::fs::write(fx.encoded_dir.join(SESSIONS_INDEX_FILE), "broken {{{").unwrap();
        // A perfectly good log that must NOT be used while a manifest exists.
        std::fs::write(
            fx.encoded_dir.join("ignored.jsonl"),
            r#"{"type":"user","timestamp":"2026-01-27T10:00:00Z"}"#,
        )
        .unwrap();

        let db = Database::new_in_memory().await.unwrap();
        let report = sync(&db, &fx.root).await.unwrap();

        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("malformed JSON"));
        assert!(report.sessions.is_empty());
        // The project row still lands, with zero sessions.
        assert_eq!(report.projects.len(), 1);
        assert_eq!(report.projects[0].session_count, 0);
        assert_eq!(report.projects[0].first_activity, None);
    }

    #[tokio::test]
    async fn test_stale_decoded_path_skipped_silently() {
        let fx = fixture();
        // A directory whose decoded path points nowhere on disk.
        std::fs::create_dir(fx.root.join("-no-such-path-here")).unwrap();
        std::fs::write(
            fx.encoded_dir.join(SESSIONS_INDEX_FILE),
            r#"[{"id": "s1", "created": 1, "modified": 2}]"#,
        )
        .unwrap();

        let db = Database::new_in_memory().await.unwrap();
        let report = sync(&db, &fx.root).await.unwrap();

        // The stale project produces neither records nor errors.
        assert_eq!(report.projects.len(), 1);
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn test_resync_removes_sessions_deleted_on_disk() {
        let fx = fixture();
        let manifest = fx.encoded_dir.join(SESSIONS_INDEX_FILE);
        std::fs::write(
            &manifest,
            r#"[
                {"id": "keep", "created": 1, "modified": 2},
                {"id": "gone", "created": 3, "modified": 4}
            ]"#,
        )
        .unwrap();

        let db = Database::new_in_memory().await.unwrap();
        sync(&db, &fx.root).await.unwrap();
        assert_eq!(db.count_sessions().await.unwrap(), 2);

        // The "gone" session disappears from the manifest.
        std::fs::write(&manifest, r#"[{"id": "keep", "created": 1, "modified": 2}]"#).unwrap();
        sync(&db, &fx.root).await.unwrap();

        let ids: Vec<String> = db
            .list_sessions()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["keep".to_string()]);
    }

    #[tokio::test]
    async fn test_partial_errors_do_not_block_valid_entries() {
        let fx = fixture();
        std::fs::write(
            fx.encoded_dir.join(SESSIONS_INDEX_FILE),
            r#"[
                {"id": "good", "created": 1, "modified": 2},
                {"created": 3, "modified": 4}
            ]"#,
        )
        .unwrap();

        let db = Database::new_in_memory().await.unwrap();
        let report = sync(&db, &fx.root).await.unwrap();

        assert_eq!(report.sessions.len(), 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.sessions[0].id, "good");
    }

    #[tokio::test]
    async fn test_status_probe() {
        let fx = fixture();
        std::fs::write(
            fx.encoded_dir.join(SESSIONS_INDEX_FILE),
            r#"[{"id": "s1", "created": 1, "modified": 2}]"#,
        )
        .unwrap();

        let db = Database::new_in_memory().await.unwrap();

        let before = status(&db, &fx.root).await.unwrap();
        assert!(before.root_found);
        assert_eq!(before.project_count, 0);
        assert_eq!(before.session_count, 0);

        sync(&db, &fx.root).await.unwrap();

        let after = status(&db, &fx.root).await.unwrap();
        assert_eq!(after.project_count, 1);
        assert_eq!(after.session_count, 1);

        let missing = status(&db, Path::new("/nonexistent/xyz")).await.unwrap();
        assert!(!missing.root_found);
    }

    #[tokio::test]
    async fn test_empty_root_found_but_no_projects() {
        let tmp = TempDir::new().unwrap();
        let db = Database::new_in_memory().await.unwrap();
        let report = sync(&db, tmp.path()).await.unwrap();

        assert!(report.root_found);
        assert!(report.projects.is_empty());
        assert!(report.errors.is_empty());
    }
}
