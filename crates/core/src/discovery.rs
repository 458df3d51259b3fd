// crates/core/src/discovery.rs
//! Project discovery: list candidate project directories under the
//! session-history root.
//!
//! A candidate is a real directory whose name starts with the path-separator
//! substitute character. Everything else (regular files, dotfiles, dirs with
//! non-conforming names) is silently excluded.

use crate::codec::PATH_SEPARATOR_SUBSTITUTE;
use crate::error::DiscoveryError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// A discovered project directory, not yet decoded or parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDir {
    /// Full path to the directory on disk.
    pub path: PathBuf,
    /// The encoded directory name (e.g. `-Users-foo-project`).
    pub encoded_name: String,
}

/// List all conforming project directories under `root`, ordered by name.
///
/// A missing root yields an empty list, not an error — first-run and
/// never-used-Claude states need no special handling at call sites.
///
/// # Errors
/// Only for environmental failures reading an existing root (permission
/// denied, other I/O).
pub async fn discover_project_dirs(root: &Path) -> Result<Vec<ProjectDir>, DiscoveryError> {
    let mut entries = match fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("Projects root does not exist: {:?}", root);
            return Ok(vec![]);
        }
        Err(e) => return Err(DiscoveryError::io(root, e)),
    };

    let mut dirs = Vec::new();

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| DiscoveryError::io(root, e))?
    {
        let file_type = match entry.file_type().await {
            Ok(ft) => ft,
            Err(_) => continue,
        };
        if !file_type.is_dir() {
            continue;
        }

        let name = entry.file_name();
        let name = match name.to_str() {
            Some(n) => n,
            None => {
                debug!("Skipping directory with non-UTF-8 name: {:?}", entry.path());
                continue;
            }
        };

        if !name.starts_with(PATH_SEPARATOR_SUBSTITUTE) {
            continue;
        }

        dirs.push(ProjectDir {
            path: entry.path(),
            encoded_name: name.to_string(),
        });
    }

    // Deterministic ordering regardless of readdir order.
    dirs.sort_by(|a, b| a.encoded_name.cmp(&b.encoded_name));

    Ok(dirs)
}
