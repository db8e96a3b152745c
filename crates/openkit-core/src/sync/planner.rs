//! Three-way reconciliation planner
//!
//! Compares desired content, current disk content and the last-installed
//! hash recorded in the ledger. The planner never mutates anything: disk
//! access goes through a [`ContentReader`] and the ledger is borrowed.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use openkit_fs::checksum::sha256_hex;
use openkit_fs::path::absolute_root;
use openkit_fs::{normalize_rel_output_path, safe_abs_path};

use super::desired::DesiredFile;
use super::plan::{Action, Plan, Reason, SyncOptions};
use super::reader::ContentReader;
use crate::Result;
use crate::ledger::{FileEntry, Ledger};

/// Compute the plan for one agent.
///
/// Desired paths are normalized and deduplicated (the last file for a path
/// wins). Any invalid or escaping path, in the desired set or in the ledger,
/// aborts the whole plan, as does any read failure other than "not found".
///
/// # Errors
///
/// Returns [`crate::Error::Fs`] for path violations and I/O failures.
pub fn build_plan<R: ContentReader + ?Sized>(
    root: &Path,
    agent_id: &str,
    desired: &[DesiredFile],
    ledger: Option<&Ledger>,
    options: &SyncOptions,
    reader: &R,
) -> Result<Plan> {
    let working_set = normalize_desired(desired)?;
    plan_working_set(root, agent_id, &working_set, ledger, options, reader)
}

/// Normalize desired output paths into the working set, keyed by path.
pub(crate) fn normalize_desired(desired: &[DesiredFile]) -> Result<BTreeMap<String, &DesiredFile>> {
    let mut working_set = BTreeMap::new();
    for file in desired {
        let path = normalize_rel_output_path(&file.output_path)?;
        if let Some(previous) = working_set.insert(path, file) {
            tracing::debug!(
                path = %previous.output_path,
                dropped = %previous.artifact_id,
                "Duplicate desired path, last one wins"
            );
        }
    }
    Ok(working_set)
}

pub(crate) fn plan_working_set<R: ContentReader + ?Sized>(
    root: &Path,
    agent_id: &str,
    working_set: &BTreeMap<String, &DesiredFile>,
    ledger: Option<&Ledger>,
    options: &SyncOptions,
    reader: &R,
) -> Result<Plan> {
    let root = absolute_root(root)?;
    let agent = ledger.and_then(|l| l.agent(agent_id));
    let mut plan = Plan::default();

    for (path, file) in working_set {
        let abs = safe_abs_path(&root, path)?;

        let Some(current) = reader.read(&abs)? else {
            plan.push(Action::Create, path, Reason::Missing, &file.artifact_id);
            continue;
        };

        let entry = agent.and_then(|a| a.files.get(path));
        let (action, reason) = classify(
            entry,
            &sha256_hex(&current),
            &sha256_hex(&file.bytes),
            options.overwrite,
        );
        plan.push(action, path, reason, &file.artifact_id);
    }

    let Some(agent) = agent else {
        return Ok(plan.finish());
    };

    // Case-folded paths a delete must never hit: on a case-insensitive
    // filesystem they name the same file as a desired path or an earlier delete.
    let mut claimed: HashSet<String> = working_set.keys().map(|p| p.to_lowercase()).collect();

    for (path, entry) in &agent.files {
        if working_set.contains_key(path) {
            continue;
        }
        plan.orphaned.push(path.clone());
        if !options.prune {
            continue;
        }

        let abs = safe_abs_path(&root, path)?;
        let Some(current) = reader.read(&abs)? else {
            tracing::debug!(%path, "Orphan already gone from disk");
            continue;
        };
        if !same_hash(&sha256_hex(&current), &entry.installed_sha256) {
            tracing::debug!(%path, "Orphan modified locally, keeping it");
            continue;
        }
        if !claimed.insert(normalize_rel_output_path(path)?.to_lowercase()) {
            tracing::debug!(%path, "Orphan collides by case with another path, keeping it");
            continue;
        }
        plan.push(
            Action::Delete,
            path,
            Reason::OrphanedManagedUnchanged,
            &entry.artifact_id,
        );
    }

    Ok(plan.finish())
}

/// Decide the action for a desired path that already exists on disk.
fn classify(
    entry: Option<&FileEntry>,
    current_sha: &str,
    desired_sha: &str,
    overwrite: bool,
) -> (Action, Reason) {
    let clobber = if overwrite {
        Action::Overwrite
    } else {
        Action::Conflict
    };

    match entry {
        None => (clobber, Reason::UnmanagedExists),
        Some(entry) if !same_hash(current_sha, &entry.installed_sha256) => {
            (clobber, Reason::ChecksumDrift)
        }
        Some(_) if current_sha == desired_sha => (Action::Skip, Reason::UpToDate),
        Some(_) => (Action::Update, Reason::ManagedUnchanged),
    }
}

/// Ledger hashes may have been hand-edited to uppercase hex.
pub(crate) fn same_hash(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}
