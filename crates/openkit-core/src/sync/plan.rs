//! Plan types produced by the planner and consumed by the executor and
//! reporters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// What the executor will do with one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Path absent on disk; write it
    Create,
    /// Managed and untouched since install; desired content changed
    Update,
    /// Existing file clobbered with permission (backed up first)
    Overwrite,
    /// Already correct
    Skip,
    /// Existing file not safe to replace without `overwrite`
    Conflict,
    /// Unmodified orphan removed under `prune` (backed up first)
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Overwrite => "overwrite",
            Self::Skip => "skip",
            Self::Conflict => "conflict",
            Self::Delete => "delete",
        }
    }

    /// Whether executing this action changes the filesystem
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Self::Create | Self::Update | Self::Overwrite | Self::Delete
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the planner chose an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reason {
    Missing,
    UnmanagedExists,
    ChecksumDrift,
    UpToDate,
    ManagedUnchanged,
    OrphanedManagedUnchanged,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::UnmanagedExists => "unmanaged-exists",
            Self::ChecksumDrift => "checksum-drift",
            Self::UpToDate => "up-to-date",
            Self::ManagedUnchanged => "managed-unchanged",
            Self::OrphanedManagedUnchanged => "orphaned-managed-unchanged",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub action: Action,
    pub path: String,
    pub reason: Reason,
    pub artifact_id: String,
}

/// A deterministic reconciliation plan.
///
/// `entries` is sorted by path, then action. Every per-action list is sorted
/// by path. `orphaned` lists every ledger path missing from the desired set,
/// whether or not pruning was requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub entries: Vec<PlanEntry>,
    pub create: Vec<String>,
    pub update: Vec<String>,
    pub overwrite: Vec<String>,
    pub skip: Vec<String>,
    pub conflicts: Vec<String>,
    pub delete: Vec<String>,
    pub orphaned: Vec<String>,
}

impl Plan {
    pub(crate) fn push(&mut self, action: Action, path: &str, reason: Reason, artifact_id: &str) {
        tracing::debug!(%path, %action, %reason, "Planned");
        self.paths_mut(action).push(path.to_string());
        self.entries.push(PlanEntry {
            action,
            path: path.to_string(),
            reason,
            artifact_id: artifact_id.to_string(),
        });
    }

    /// Sort every list so output does not depend on input order.
    pub(crate) fn finish(mut self) -> Self {
        for action in [
            Action::Create,
            Action::Update,
            Action::Overwrite,
            Action::Skip,
            Action::Conflict,
            Action::Delete,
        ] {
            self.paths_mut(action).sort();
        }
        self.orphaned.sort();
        self.entries
            .sort_by(|a, b| a.path.cmp(&b.path).then(a.action.cmp(&b.action)));
        self
    }

    fn paths_mut(&mut self, action: Action) -> &mut Vec<String> {
        match action {
            Action::Create => &mut self.create,
            Action::Update => &mut self.update,
            Action::Overwrite => &mut self.overwrite,
            Action::Skip => &mut self.skip,
            Action::Conflict => &mut self.conflicts,
            Action::Delete => &mut self.delete,
        }
    }

    /// Paths planned for `action`, sorted
    pub fn paths(&self, action: Action) -> &[String] {
        match action {
            Action::Create => &self.create,
            Action::Update => &self.update,
            Action::Overwrite => &self.overwrite,
            Action::Skip => &self.skip,
            Action::Conflict => &self.conflicts,
            Action::Delete => &self.delete,
        }
    }

    /// The entry planned for `path`, if any
    pub fn entry(&self, path: &str) -> Option<&PlanEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// True when executing the plan would not touch the filesystem
    pub fn is_noop(&self) -> bool {
        !self.entries.iter().any(|e| e.action.mutates())
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// One-line human summary, e.g. `2 create, 1 conflict, 3 orphaned`.
    ///
    /// Empty categories are omitted; an empty plan reads `nothing to do`.
    pub fn summary(&self) -> String {
        let counts = [
            (self.create.len(), "create"),
            (self.update.len(), "update"),
            (self.overwrite.len(), "overwrite"),
            (self.skip.len(), "skip"),
            (self.conflicts.len(), "conflict"),
            (self.delete.len(), "delete"),
            (self.orphaned.len(), "orphaned"),
        ];
        let parts: Vec<String> = counts
            .iter()
            .filter(|(n, _)| *n > 0)
            .map(|(n, label)| format!("{n} {label}"))
            .collect();
        if parts.is_empty() {
            "nothing to do".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Permissions for a sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Compute the plan only; never touch disk or ledger
    pub dry_run: bool,
    /// Allow clobbering unmanaged or drifted files (after a backup)
    pub overwrite: bool,
    /// Allow deleting orphans whose content still matches the ledger
    pub prune: bool,
}

/// Outcome of an apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyResult {
    pub plan: Plan,
    /// Backup directory used by this run, if anything was backed up
    pub backups_dir: Option<PathBuf>,
}
