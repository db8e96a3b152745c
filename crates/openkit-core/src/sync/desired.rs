//! Desired files and the producers that build them
//!
//! A desired file is what an external producer wants present at a path. The
//! engine never renders content itself; it only consumes these values.

use crate::Result;
use std::fs;
use std::path::Path;

/// The only mode whose semantics the executor interprets: write bytes verbatim.
pub const MODE_COPY: &str = "copy";

/// Target content for one project-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredFile {
    /// Project-relative output path; normalized by the planner
    pub output_path: String,
    pub bytes: Vec<u8>,
    /// Stable, opaque provenance of the content
    pub artifact_id: String,
    /// Mode tag, stored in the ledger; only `copy` is interpreted
    pub mode: String,
}

impl DesiredFile {
    /// A `copy` mode desired file
    pub fn copy(
        output_path: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        artifact_id: impl Into<String>,
    ) -> Self {
        Self {
            output_path: output_path.into(),
            bytes: bytes.into(),
            artifact_id: artifact_id.into(),
            mode: MODE_COPY.to_string(),
        }
    }
}

/// Build desired files from every regular file under `source_dir`.
///
/// Each file at `source_dir/<rel>` becomes a `copy` entry with output path
/// `output_prefix/<rel>` and artifact id `artifact_prefix/<rel>`. Symlinks are
/// skipped. The result is sorted by output path.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be walked or a file cannot
/// be read.
pub fn desired_from_dir(
    source_dir: &Path,
    output_prefix: &str,
    artifact_prefix: &str,
) -> Result<Vec<DesiredFile>> {
    let mut relative = Vec::new();
    collect_files(source_dir, "", &mut relative)?;

    let mut out = Vec::with_capacity(relative.len());
    for rel in relative {
        let source = rel.split('/').fold(source_dir.to_path_buf(), |p, s| p.join(s));
        let bytes = fs::read(&source).map_err(|e| openkit_fs::Error::io(&source, e))?;
        out.push(DesiredFile::copy(
            prefixed(output_prefix, &rel),
            bytes,
            prefixed(artifact_prefix, &rel),
        ));
    }

    out.sort_by(|a, b| a.output_path.cmp(&b.output_path));
    Ok(out)
}

/// Build a single `copy` desired file from a file on disk.
///
/// # Errors
///
/// Returns an I/O error if `source` cannot be read.
pub fn desired_file(source: &Path, output_path: &str, artifact_id: &str) -> Result<DesiredFile> {
    let bytes = fs::read(source).map_err(|e| openkit_fs::Error::io(source, e))?;
    Ok(DesiredFile::copy(output_path, bytes, artifact_id))
}

fn collect_files(dir: &Path, rel_dir: &str, out: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir).map_err(|e| openkit_fs::Error::io(dir, e))? {
        let entry = entry.map_err(|e| openkit_fs::Error::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().to_string();
        let rel = prefixed(rel_dir, &name);
        let file_type = entry
            .file_type()
            .map_err(|e| openkit_fs::Error::io(entry.path(), e))?;

        if file_type.is_dir() {
            collect_files(&entry.path(), &rel, out)?;
        } else if file_type.is_file() {
            out.push(rel);
        } else {
            tracing::debug!(path = %entry.path().display(), "Skipping non-regular file");
        }
    }
    Ok(())
}

fn prefixed(prefix: &str, rel: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        rel.to_string()
    } else {
        format!("{prefix}/{rel}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn desired_from_dir_walks_tree_sorted() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("skills");
        fs::create_dir_all(base.join("review")).unwrap();
        fs::write(base.join("z.md"), "z").unwrap();
        fs::write(base.join("review").join("SKILL.md"), "skill").unwrap();

        let files = desired_from_dir(&base, ".claude/skills", "embedded/base/skills").unwrap();

        let paths: Vec<_> = files.iter().map(|f| f.output_path.as_str()).collect();
        assert_eq!(paths, vec![".claude/skills/review/SKILL.md", ".claude/skills/z.md"]);
        assert_eq!(files[0].artifact_id, "embedded/base/skills/review/SKILL.md");
        assert_eq!(files[0].bytes, b"skill");
        assert!(files.iter().all(|f| f.mode == MODE_COPY));
    }

    #[test]
    fn empty_prefix_keeps_relative_path() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("AGENTS.md"), "a").unwrap();

        let files = desired_from_dir(temp.path(), "", "embedded").unwrap();
        assert_eq!(files[0].output_path, "AGENTS.md");
        assert_eq!(files[0].artifact_id, "embedded/AGENTS.md");
    }

    #[test]
    fn missing_source_dir_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(desired_from_dir(&temp.path().join("nope"), "x", "y").is_err());
    }

    #[test]
    fn desired_file_reads_single_source() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("opencode.json");
        fs::write(&source, "{}").unwrap();

        let file = desired_file(&source, "opencode.json", "embedded/root/opencode.json").unwrap();
        assert_eq!(file, DesiredFile::copy("opencode.json", "{}", "embedded/root/opencode.json"));
    }
}
