//! Relative output path validation and root-confined resolution
//!
//! Output paths are stored with forward slashes and compared as plain
//! strings. They reach the engine from two places: template producers and the
//! ledger file on disk. The latter may be hand-edited, so every path is checked
//! again before it is resolved against the project root.

use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// Normalize a project-relative output path.
///
/// Trims surrounding whitespace, converts backslashes to forward slashes and
/// drops empty and `.` segments (so a leading `./` disappears). The path is
/// rejected when it is empty after cleaning, absolute, or contains a `..`
/// segment anywhere. `..` is never resolved lexically: `a/../b` is an error,
/// not `b`.
///
/// This function performs no filesystem access.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] describing the first violation found.
pub fn normalize_rel_output_path(path: &str) -> Result<String> {
    let slashed = path.trim().replace('\\', "/");

    if slashed.starts_with('/') || has_drive_prefix(&slashed) {
        return Err(Error::invalid_path(path, "output path must be relative"));
    }

    let mut segments = Vec::new();
    for segment in slashed.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(Error::invalid_path(path, "output path contains '..'")),
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return Err(Error::invalid_path(path, "output path is empty"));
    }

    Ok(segments.join("/"))
}

/// Resolve a relative output path against the project root.
///
/// The root is made absolute and lexically cleaned; the normalized relative
/// path is joined onto it. The result must equal the root or lie strictly
/// beneath it, compared component by component so `/project-other` never
/// counts as inside `/project`.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] when `rel` fails normalization,
/// [`Error::PathEscape`] when the resolved path leaves the root, and
/// [`Error::Io`] when the current directory is needed but unavailable.
pub fn safe_abs_path(root: &Path, rel: &str) -> Result<PathBuf> {
    let rel = normalize_rel_output_path(rel)?;
    let root_abs = absolute_root(root)?;

    let mut target = root_abs.clone();
    for segment in rel.split('/') {
        target.push(segment);
    }
    let target = lexical_clean(&target);

    if target != root_abs && !target.starts_with(&root_abs) {
        return Err(Error::PathEscape {
            path: rel,
            root: root_abs,
        });
    }
    Ok(target)
}

/// Absolute, lexically cleaned form of the project root.
///
/// # Errors
///
/// Returns [`Error::Io`] if the root is relative and the current directory
/// cannot be determined.
pub fn absolute_root(root: &Path) -> Result<PathBuf> {
    let abs = std::path::absolute(root).map_err(|e| Error::io(root, e))?;
    Ok(lexical_clean(dunce::simplified(&abs)))
}

/// Remove `.` components and fold `..` into its parent without touching the
/// filesystem.
fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping past the root is a no-op, matching how the OS resolves `/..`.
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// `C:/` and bare `C:` name a drive and are refused on every host. On Windows
/// any `C:` prefix is refused, `C:foo` being drive-relative; elsewhere
/// `a:b.txt` is a plain file name.
fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    if bytes.len() < 2 || !bytes[0].is_ascii_alphabetic() || bytes[1] != b':' {
        return false;
    }
    cfg!(windows) || bytes.len() == 2 || bytes[2] == b'/'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn lexical_clean_folds_parent_segments() {
        let cleaned = lexical_clean(Path::new("/a/b/./c/../d"));
        assert_eq!(cleaned, PathBuf::from("/a/b/d"));
    }

    #[test]
    fn drive_prefix_detection() {
        assert!(has_drive_prefix("C:/Windows"));
        assert!(has_drive_prefix("d:"));
        assert!(!has_drive_prefix("c"));
        assert!(!has_drive_prefix("src/c:d"));
    }

    #[test]
    #[cfg(unix)]
    fn colon_in_file_name_is_not_a_drive() {
        assert!(!has_drive_prefix("a:b.txt"));
        assert_eq!(normalize_rel_output_path("a:b.txt").unwrap(), "a:b.txt");
        assert!(normalize_rel_output_path("C:\\Windows\\x").is_err());
    }

    #[test]
    #[cfg(unix)]
    fn absolute_root_is_cleaned() {
        let root = absolute_root(Path::new("/tmp/project/./sub/..")).unwrap();
        assert_eq!(root, PathBuf::from("/tmp/project"));
    }
}
