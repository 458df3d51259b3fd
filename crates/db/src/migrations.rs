// crates/db/src/migrations.rs

/// Inline SQL migrations for the claude-scope cache schema.
///
/// We use simple inline migrations rather than sqlx migration files
/// because the schema is small and self-contained.

pub const MIGRATIONS: &[&str] = &[
    // Migration 1: projects table
    r#"
CREATE TABLE IF NOT EXISTS projects (
    path TEXT PRIMARY KEY,
    display_name TEXT NOT NULL DEFAULT '',
    first_activity INTEGER,
    last_activity INTEGER,
    session_count INTEGER NOT NULL DEFAULT 0,
    message_count INTEGER NOT NULL DEFAULT 0,
    group_name TEXT,
    hidden INTEGER NOT NULL DEFAULT 0,
    merged_into TEXT
);
"#,
    // Migration 2: sessions table
    r#"
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    project_path TEXT NOT NULL,
    created INTEGER NOT NULL,
    modified INTEGER NOT NULL,
    duration INTEGER NOT NULL DEFAULT 0,
    message_count INTEGER NOT NULL DEFAULT 0,
    summary TEXT,
    first_prompt TEXT,
    git_branch TEXT
);
"#,
    // Migration 3: session indexes for by-project pagination and date ranges
    r#"
CREATE INDEX IF NOT EXISTS idx_sessions_project_modified ON sessions(project_path, modified DESC);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_sessions_modified ON sessions(modified DESC);
"#,
];
