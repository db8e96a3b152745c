//! [`TestProject`] builder for reconciliation test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const KIT_DIR: &str = ".openkit";
const LEDGER_FILE: &str = "managed.json";
const BACKUPS_DIR: &str = "backups";

/// A temporary project directory with helpers for setup and assertion.
///
/// Paths passed to helpers are relative to the project root and use `/`.
///
/// # Example
///
/// ```rust,no_run
/// use openkit_test_utils::TestProject;
///
/// let project = TestProject::new().with_file("docs/a.md", "hello");
/// project.assert_file_contains("docs/a.md", "hello");
/// project.assert_file_not_exists(".openkit/managed.json");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty temporary project.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root path of the project.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `rel` inside the project.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Builder form of [`TestProject::write`].
    pub fn with_file(self, rel: &str, content: &str) -> Self {
        self.write(rel, content);
        self
    }

    /// Write `content` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) {
        let full_path = self.path(rel);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Could not write {}: {e}", full_path.display()));
    }

    /// Read `rel` as UTF-8.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, rel: &str) -> String {
        let full_path = self.path(rel);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|e| panic!("Could not read {}: {e}", full_path.display()))
    }

    /// Path of the ledger file.
    pub fn ledger_path(&self) -> PathBuf {
        self.root().join(KIT_DIR).join(LEDGER_FILE)
    }

    /// Write raw ledger content, bypassing any validation.
    pub fn write_ledger_raw(&self, content: &str) {
        self.write(&format!("{KIT_DIR}/{LEDGER_FILE}"), content);
    }

    /// Parse the ledger file as untyped JSON.
    ///
    /// # Panics
    /// Panics if the ledger is absent or not valid JSON.
    pub fn ledger_json(&self) -> serde_json::Value {
        let content = self.read(&format!("{KIT_DIR}/{LEDGER_FILE}"));
        serde_json::from_str(&content)
            .unwrap_or_else(|e| panic!("Ledger is not valid JSON: {e}\n{content}"))
    }

    /// Timestamped backup directories, sorted by name.
    pub fn backup_dirs(&self) -> Vec<PathBuf> {
        let backups = self.root().join(KIT_DIR).join(BACKUPS_DIR);
        let Ok(entries) = fs::read_dir(&backups) else {
            return Vec::new();
        };
        let mut dirs: Vec<PathBuf> = entries
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.is_dir())
            .collect();
        dirs.sort();
        dirs
    }

    /// Content of `rel` in the most recent backup directory.
    ///
    /// # Panics
    /// Panics if there is no backup or it does not hold `rel`.
    pub fn read_latest_backup(&self, rel: &str) -> String {
        let dir = self
            .backup_dirs()
            .pop()
            .unwrap_or_else(|| panic!("No backup directory under {}", self.root().display()));
        let full_path = dir.join(rel);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|e| panic!("Could not read backup {}: {e}", full_path.display()))
    }

    /// Assert that `rel` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, rel: &str) {
        let full_path = self.path(rel);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `rel` does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, rel: &str) {
        let full_path = self.path(rel);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `rel` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, rel: &str, content: &str) {
        let file_content = self.read(rel);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            rel,
            content,
            file_content
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_parents() {
        let project = TestProject::new().with_file("a/b/c.txt", "x");
        project.assert_file_exists("a/b/c.txt");
        assert_eq!(project.read("a/b/c.txt"), "x");
    }

    #[test]
    fn backup_dirs_empty_without_backups() {
        let project = TestProject::new();
        assert!(project.backup_dirs().is_empty());
    }

    #[test]
    fn latest_backup_is_last_sorted() {
        let project = TestProject::new()
            .with_file(".openkit/backups/2024-01-01T00-00-00Z/a.md", "old")
            .with_file(".openkit/backups/2025-01-01T00-00-00Z/a.md", "new");
        assert_eq!(project.backup_dirs().len(), 2);
        assert_eq!(project.read_latest_backup("a.md"), "new");
    }
}
