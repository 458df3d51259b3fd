// crates/core/src/paths.rs
//! Centralized path functions for all app storage locations.
//!
//! Single source of truth — eliminates ad-hoc `dirs::cache_dir().join(...)`
//! scattered across crates.

use std::path::PathBuf;

/// Default session-history root: `~/.claude/projects`.
pub fn default_projects_root() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".claude").join("projects"))
}

/// App cache root: `~/Library/Caches/claude-scope/` (macOS) or
/// `~/.cache/claude-scope/` (Linux).
pub fn app_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("claude-scope"))
}

/// SQLite database file: `<app_cache_dir>/claude-scope.db`.
pub fn db_path() -> Option<PathBuf> {
    app_cache_dir().map(|d| d.join("claude-scope.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_projects_root() {
        let root = default_projects_root().unwrap();
        assert!(root.ends_with(".claude/projects"));
    }

    #[test]
    fn test_db_path() {
        let path = db_path().unwrap();
        assert!(path.to_string_lossy().contains("claude-scope"));
        assert!(path.to_string_lossy().ends_with("claude-scope.db"));
    }
}
