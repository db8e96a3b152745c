//! Drift check between the ledger and the filesystem
//!
//! Answers "do the files we installed still look the way we left them?"
//! without planning or writing anything.

use std::path::Path;

use openkit_fs::checksum::sha256_hex;
use openkit_fs::safe_abs_path;
use serde::{Deserialize, Serialize};

use super::planner::same_hash;
use super::reader::ContentReader;
use crate::Result;
use crate::ledger::Ledger;

/// Status of the drift check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    /// Every managed file matches its recorded hash
    Healthy,
    /// Some managed files are gone from disk
    Missing,
    /// Some managed files were edited after install
    Drifted,
    /// The ledger is unreadable or holds an unusable path
    Broken,
}

impl CheckStatus {
    fn severity(self) -> u8 {
        match self {
            CheckStatus::Healthy => 0,
            CheckStatus::Missing => 1,
            CheckStatus::Drifted => 2,
            CheckStatus::Broken => 3,
        }
    }

    /// The worse of two statuses: Broken > Drifted > Missing > Healthy
    pub fn worst(self, other: CheckStatus) -> CheckStatus {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }
}

/// A managed file that is missing or drifted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftItem {
    /// Relative output path as recorded in the ledger
    pub path: String,
    /// Artifact the file was installed from
    pub artifact_id: String,
    /// Human-readable description
    pub description: String,
}

/// Result of [`check_ledger`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub status: CheckStatus,
    pub drifted: Vec<DriftItem>,
    pub missing: Vec<DriftItem>,
    pub messages: Vec<String>,
}

impl CheckReport {
    /// A report with no issues
    pub fn healthy() -> Self {
        Self {
            status: CheckStatus::Healthy,
            drifted: Vec::new(),
            missing: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// A report for a ledger that could not be used at all
    pub fn broken(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Broken,
            messages: vec![message.into()],
            ..Self::healthy()
        }
    }

    /// Combine two reports; the status is the worst of both.
    pub fn merge(mut self, other: CheckReport) -> Self {
        self.drifted.extend(other.drifted);
        self.missing.extend(other.missing);
        self.messages.extend(other.messages);
        self.status = self.status.worst(other.status);
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.status == CheckStatus::Healthy
    }

    fn add_missing(&mut self, item: DriftItem) {
        self.missing.push(item);
        self.status = self.status.worst(CheckStatus::Missing);
    }

    fn add_drifted(&mut self, item: DriftItem) {
        self.drifted.push(item);
        self.status = self.status.worst(CheckStatus::Drifted);
    }
}

/// Compare every ledger file of `agent_id` against disk.
///
/// An agent with no ledger state is healthy. A recorded path that fails
/// validation marks the report broken instead of aborting, so one bad entry
/// does not hide the state of the others.
///
/// # Errors
///
/// Read failures other than "not found" are propagated.
pub fn check_ledger<R: ContentReader + ?Sized>(
    root: &Path,
    agent_id: &str,
    ledger: &Ledger,
    reader: &R,
) -> Result<CheckReport> {
    let mut report = CheckReport::healthy();
    let Some(agent) = ledger.agent(agent_id) else {
        return Ok(report);
    };

    for (path, entry) in &agent.files {
        let abs = match safe_abs_path(root, path) {
            Ok(abs) => abs,
            Err(e) => {
                tracing::warn!(%path, error = %e, "Ledger holds an unusable path");
                report = report.merge(CheckReport::broken(e.to_string()));
                continue;
            }
        };

        let item = |description: String| DriftItem {
            path: path.clone(),
            artifact_id: entry.artifact_id.clone(),
            description,
        };

        match reader.read(&abs)? {
            None => report.add_missing(item("file not found".to_string())),
            Some(current) => {
                let current_sha = sha256_hex(&current);
                if !same_hash(&current_sha, &entry.installed_sha256) {
                    report.add_drifted(item(format!(
                        "checksum mismatch: recorded {}, found {}",
                        entry.installed_sha256, current_sha
                    )));
                }
            }
        }
    }

    tracing::debug!(
        agent = %agent_id,
        status = ?report.status,
        missing = report.missing.len(),
        drifted = report.drifted.len(),
        "Drift check finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::FileEntry;
    use crate::sync::DiskReader;
    use std::fs;
    use tempfile::TempDir;

    fn item(path: &str) -> DriftItem {
        DriftItem {
            path: path.to_string(),
            artifact_id: format!("embedded/{path}"),
            description: "test".to_string(),
        }
    }

    fn installed(ledger: &mut Ledger, path: &str, content: &str) {
        ledger.ensure_agent("claude").files.insert(
            path.to_string(),
            FileEntry::installed(format!("embedded/{path}"), content.as_bytes(), "copy"),
        );
    }

    #[test]
    fn test_healthy_report() {
        let report = CheckReport::healthy();
        assert_eq!(report.status, CheckStatus::Healthy);
        assert!(report.is_healthy());
        assert!(report.drifted.is_empty());
        assert!(report.missing.is_empty());
        assert!(report.messages.is_empty());
    }

    #[test]
    fn test_broken_report_keeps_message() {
        let report = CheckReport::broken("bad ledger");
        assert_eq!(report.status, CheckStatus::Broken);
        assert_eq!(report.messages, vec!["bad ledger".to_string()]);
    }

    #[test]
    fn test_merge_takes_worst_status() {
        let mut missing = CheckReport::healthy();
        missing.add_missing(item("a.md"));
        let mut drifted = CheckReport::healthy();
        drifted.add_drifted(item("b.md"));

        let merged = missing.merge(drifted);
        assert_eq!(merged.status, CheckStatus::Drifted);
        assert_eq!(merged.missing.len(), 1);
        assert_eq!(merged.drifted.len(), 1);

        let merged = merged.merge(CheckReport::broken("x"));
        assert_eq!(merged.status, CheckStatus::Broken);
    }

    #[test]
    fn test_missing_does_not_downgrade_drifted() {
        let mut report = CheckReport::healthy();
        report.add_drifted(item("a.md"));
        report.add_missing(item("b.md"));
        assert_eq!(report.status, CheckStatus::Drifted);
    }

    #[test]
    fn test_unknown_agent_is_healthy() {
        let dir = TempDir::new().unwrap();
        let report =
            check_ledger(dir.path(), "nobody", &Ledger::new(), &DiskReader).unwrap();
        assert!(report.is_healthy());
    }

    #[test]
    fn test_check_finds_missing_and_drifted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("same.md"), "v1").unwrap();
        fs::write(dir.path().join("edited.md"), "local edit").unwrap();

        let mut ledger = Ledger::new();
        installed(&mut ledger, "same.md", "v1");
        installed(&mut ledger, "edited.md", "v1");
        installed(&mut ledger, "gone.md", "v1");

        let report =
            check_ledger(dir.path(), "claude", &ledger, &DiskReader).unwrap();

        assert_eq!(report.status, CheckStatus::Drifted);
        assert_eq!(report.missing.len(), 1);
        assert_eq!(report.missing[0].path, "gone.md");
        assert_eq!(report.drifted.len(), 1);
        assert_eq!(report.drifted[0].path, "edited.md");
        assert_eq!(report.drifted[0].artifact_id, "embedded/edited.md");
    }

    #[test]
    fn test_hostile_ledger_path_is_broken_not_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ok.md"), "v1").unwrap();

        let mut ledger = Ledger::new();
        installed(&mut ledger, "ok.md", "v1");
        installed(&mut ledger, "../outside.md", "v1");

        let report =
            check_ledger(dir.path(), "claude", &ledger, &DiskReader).unwrap();
        assert_eq!(report.status, CheckStatus::Broken);
        assert_eq!(report.messages.len(), 1);
        assert!(report.drifted.is_empty());
    }
}
