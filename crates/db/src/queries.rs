// crates/db/src/queries.rs
// Project and session CRUD: upserts, batched writes, and read queries.

use crate::{Database, DbResult};
use claude_scope_types::{ProjectRecord, SessionRecord};

/// One page of a project's sessions plus the total row count, so callers can
/// render consistent pagination.
#[derive(Debug, Clone)]
pub struct SessionPage {
    pub sessions: Vec<SessionRecord>,
    pub total: i64,
}

#[derive(Debug)]
struct ProjectRow {
    path: String,
    display_name: String,
    first_activity: Option<i64>,
    last_activity: Option<i64>,
    session_count: i64,
    message_count: i64,
    group_name: Option<String>,
    hidden: i64,
    merged_into: Option<String>,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for ProjectRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Self {
            path: row.try_get("path")?,
            display_name: row.try_get("display_name")?,
            first_activity: row.try_get("first_activity")?,
            last_activity: row.try_get("last_activity")?,
            session_count: row.try_get("session_count")?,
            message_count: row.try_get("message_count")?,
            group_name: row.try_get("group_name")?,
            hidden: row.try_get("hidden")?,
            merged_into: row.try_get("merged_into")?,
        })
    }
}

impl From<ProjectRow> for ProjectRecord {
    fn from(r: ProjectRow) -> Self {
        ProjectRecord {
            path: r.path,
            display_name: r.display_name,
            first_activity: r.first_activity,
            last_activity: r.last_activity,
            session_count: r.session_count,
            message_count: r.message_count,
            group_name: r.group_name,
            hidden: r.hidden != 0,
            merged_into: r.merged_into,
        }
    }
}

#[derive(Debug)]
struct SessionRow {
    id: String,
    project_path: String,
    created: i64,
    modified: i64,
    duration: i64,
    message_count: i64,
    summary: Option<String>,
    first_prompt: Option<String>,
    git_branch: Option<String>,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for SessionRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Self {
            id: row.try_get("id")?,
            project_path: row.try_get("project_path")?,
            created: row.try_get("created")?,
            modified: row.try_get("modified")?,
            duration: row.try_get("duration")?,
            message_count: row.try_get("message_count")?,
            summary: row.try_get("summary")?,
            first_prompt: row.try_get("first_prompt")?,
            git_branch: row.try_get("git_branch")?,
        })
    }
}

impl From<SessionRow> for SessionRecord {
    fn from(r: SessionRow) -> Self {
        SessionRecord {
            id: r.id,
            project_path: r.project_path,
            created: r.created,
            modified: r.modified,
            duration_ms: r.duration,
            message_count: r.message_count,
            summary: r.summary,
            first_prompt: r.first_prompt,
            git_branch: r.git_branch,
        }
    }
}

const SESSION_COLUMNS: &str =
    "id, project_path, created, modified, duration, message_count, summary, first_prompt, git_branch";

impl Database {
    /// Upsert a project keyed by path.
    ///
    /// Replaces the computed aggregates but deliberately leaves the
    /// pass-through UI columns (`group_name`, `hidden`, `merged_into`)
    /// untouched on conflict — those are owned by the consuming layer.
    pub async fn upsert_project(&self, project: &ProjectRecord) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO projects (
                path, display_name, first_activity, last_activity,
                session_count, message_count, group_name, hidden, merged_into
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(path) DO UPDATE SET
                display_name = excluded.display_name,
                first_activity = excluded.first_activity,
                last_activity = excluded.last_activity,
                session_count = excluded.session_count,
                message_count = excluded.message_count
            "#,
        )
        .bind(&project.path)
        .bind(&project.display_name)
        .bind(project.first_activity)
        .bind(project.last_activity)
        .bind(project.session_count)
        .bind(project.message_count)
        .bind(&project.group_name)
        .bind(project.hidden as i64)
        .bind(&project.merged_into)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Upsert a batch of sessions inside one transaction.
    pub async fn insert_sessions(&self, sessions: &[SessionRecord]) -> DbResult<()> {
        let mut tx = self.pool().begin().await?;
        for session in sessions {
            upsert_session_tx(&mut tx, session).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Replace all of one project's sessions: delete-then-reinsert in a
    /// single transaction, so stale rows for sessions removed on disk
    /// disappear and readers never observe a partial state.
    pub async fn replace_project_sessions(
        &self,
        project_path: &str,
        sessions: &[SessionRecord],
    ) -> DbResult<()> {
        let mut tx = self.pool().begin().await?;
        sqlx::query("DELETE FROM sessions WHERE project_path = ?1")
            .bind(project_path)
            .execute(&mut *tx)
            .await?;
        for session in sessions {
            upsert_session_tx(&mut tx, session).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Delete only one project's sessions.
    pub async fn delete_project_sessions(&self, project_path: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE project_path = ?1")
            .bind(project_path)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }

    /// Empty both collections.
    pub async fn clear_all(&self) -> DbResult<()> {
        let mut tx = self.pool().begin().await?;
        sqlx::query("DELETE FROM sessions").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM projects").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    /// All projects, most recently active first (projects that have never
    /// seen a session sort last).
    pub async fn list_projects(&self) -> DbResult<Vec<ProjectRecord>> {
        let rows: Vec<ProjectRow> = sqlx::query_as(
            r#"
            SELECT path, display_name, first_activity, last_activity,
                   session_count, message_count, group_name, hidden, merged_into
            FROM projects
            ORDER BY last_activity IS NULL, last_activity DESC
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_project(&self, path: &str) -> DbResult<Option<ProjectRecord>> {
        let row: Option<ProjectRow> = sqlx::query_as(
            r#"
            SELECT path, display_name, first_activity, last_activity,
                   session_count, message_count, group_name, hidden, merged_into
            FROM projects
            WHERE path = ?1
            "#,
        )
        .bind(path)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Into::into))
    }

    pub async fn count_projects(&self) -> DbResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
            .fetch_one(self.pool())
            .await?;
        Ok(row.0)
    }

    /// All sessions, most recently modified first.
    pub async fn list_sessions(&self) -> DbResult<Vec<SessionRecord>> {
        let rows: Vec<SessionRow> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions ORDER BY modified DESC"
        ))
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// One page of a project's sessions, modified-descending, with the
    /// project's total session count for consistent pagination.
    pub async fn list_sessions_by_project(
        &self,
        project_path: &str,
        limit: i64,
        offset: i64,
    ) -> DbResult<SessionPage> {
        let rows: Vec<SessionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {SESSION_COLUMNS} FROM sessions
            WHERE project_path = ?1
            ORDER BY modified DESC
            LIMIT ?2 OFFSET ?3
            "#
        ))
        .bind(project_path)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await?;

        let total = self.count_sessions_for_project(project_path).await?;

        Ok(SessionPage {
            sessions: rows.into_iter().map(Into::into).collect(),
            total,
        })
    }

    /// Sessions whose `modified` timestamp falls within `[start, end]`
    /// (epoch milliseconds, inclusive), most recent first.
    pub async fn list_sessions_by_date_range(
        &self,
        start: i64,
        end: i64,
    ) -> DbResult<Vec<SessionRecord>> {
        let rows: Vec<SessionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {SESSION_COLUMNS} FROM sessions
            WHERE modified >= ?1 AND modified <= ?2
            ORDER BY modified DESC
            "#
        ))
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn count_sessions(&self) -> DbResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions")
            .fetch_one(self.pool())
            .await?;
        Ok(row.0)
    }

    pub async fn count_sessions_for_project(&self, project_path: &str) -> DbResult<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sessions WHERE project_path = ?1")
                .bind(project_path)
                .fetch_one(self.pool())
                .await?;
        Ok(row.0)
    }
}

/// Upsert one session inside an open transaction.
async fn upsert_session_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    session: &SessionRecord,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sessions (
            id, project_path, created, modified, duration,
            message_count, summary, first_prompt, git_branch
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(id) DO UPDATE SET
            project_path = excluded.project_path,
            created = excluded.created,
            modified = excluded.modified,
            duration = excluded.duration,
            message_count = excluded.message_count,
            summary = excluded.summary,
            first_prompt = excluded.first_prompt,
            git_branch = excluded.git_branch
        "#,
    )
    .bind(&session.id)
    .bind(&session.project_path)
    .bind(session.created)
    .bind(session.modified)
    .bind(session.duration_ms)
    .bind(session.message_count)
    .bind(&session.summary)
    .bind(&session.first_prompt)
    .bind(&session.git_branch)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
