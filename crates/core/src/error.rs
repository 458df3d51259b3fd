// crates/core/src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during project-directory discovery.
///
/// A missing root is deliberately *not* represented here: discovery treats it
/// as a legitimate empty state and returns no directories.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Cannot access projects directory: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("IO error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DiscoveryError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Errors that can occur opening or reading a session log file.
///
/// Malformed *lines* are never errors — they are skipped with a debug log.
/// Only whole-file conditions (missing, unreadable) surface here.
#[derive(Debug, Error)]
pub enum LogParseError {
    #[error("Session log not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Permission denied reading session log: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LogParseError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }
}
