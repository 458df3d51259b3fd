// crates/core/src/codec.rs
//! Reversible mapping between a filesystem path and the flat directory-name
//! token Claude Code uses under `~/.claude/projects/`.
//!
//! `/Users/foo/my-project` is stored as `-Users-foo-my-project`: every path
//! separator becomes the substitute character. Paths that themselves contain
//! the substitute character are ambiguous on decode; that loss is accepted
//! and the sync layer's existence check is the safety net.

use std::path::{Path, PathBuf};

/// The character that stands in for `/` in encoded directory names.
pub const PATH_SEPARATOR_SUBSTITUTE: char = '-';

/// Encode a project path as one flat directory-name token.
pub fn encode_project_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('/', &PATH_SEPARATOR_SUBSTITUTE.to_string())
}

/// Decode an encoded directory name back into a filesystem path.
///
/// Exact inverse of [`encode_project_path`] for paths that contain no
/// substitute character.
pub fn decode_project_dir(encoded: &str) -> PathBuf {
    PathBuf::from(encoded.replace(PATH_SEPARATOR_SUBSTITUTE, "/"))
}

/// Human-readable project name: the final path segment, or the whole path
/// when there is no final segment (e.g. `/`).
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_simple_path() {
        assert_eq!(encode_project_path(Path::new("/Users/foo/bar")), "-Users-foo-bar");
        assert_eq!(encode_project_path(Path::new("/tmp")), "-tmp");
    }

    #[test]
    fn test_decode_inverts_encode() {
        for p in ["/Users/foo/bar", "/tmp", "/home/u/.config/app", "/a/b/c/d/e"] {
            let path = Path::new(p);
            assert_eq!(decode_project_dir(&encode_project_path(path)), path);
        }
    }

    #[test]
    fn test_decode_ambiguous_when_path_contains_substitute() {
        // Accepted lossy edge case: the hyphen inside the directory name is
        // indistinguishable from a separator.
        let encoded = encode_project_path(Path::new("/Users/foo/my-project"));
        assert_eq!(encoded, "-Users-foo-my-project");
        assert_eq!(
            decode_project_dir(&encoded),
            PathBuf::from("/Users/foo/my/project")
        );
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/Users/foo/bar")), "bar");
        assert_eq!(display_name(Path::new("/tmp")), "tmp");
        assert_eq!(display_name(Path::new("/")), "/");
    }
}
