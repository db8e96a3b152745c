//! Plan execution
//!
//! Realizes a plan against the filesystem in plan order and records every
//! successful write in the ledger. The ledger is mutated in place and never
//! persisted here: if execution stops half way, the caller still holds a
//! ledger describing exactly the files already written.

use std::path::Path;

use openkit_fs::path::absolute_root;
use openkit_fs::{io, safe_abs_path};

use super::desired::{DesiredFile, MODE_COPY};
use super::plan::{Action, ApplyResult, PlanEntry, SyncOptions};
use super::planner::{normalize_desired, plan_working_set};
use super::reader::ContentReader;
use crate::backup::BackupSession;
use crate::ledger::{AgentState, FileEntry, Ledger, PackState};
use crate::{Error, Result};

/// Plan and, unless `dry_run`, execute a sync for one agent.
///
/// `pack` is stamped on the agent's ledger state even when nothing changes.
/// In dry-run mode neither disk nor ledger is touched.
///
/// # Errors
///
/// Planning errors abort before any mutation. Execution errors abort mid-way;
/// files already written stay written and recorded in `ledger`.
pub(crate) fn apply<R: ContentReader + ?Sized>(
    root: &Path,
    agent_id: &str,
    pack: &PackState,
    desired: &[DesiredFile],
    ledger: &mut Ledger,
    options: &SyncOptions,
    reader: &R,
) -> Result<ApplyResult> {
    let working_set = normalize_desired(desired)?;
    let plan = plan_working_set(root, agent_id, &working_set, Some(&*ledger), options, reader)?;

    if options.dry_run {
        tracing::info!(agent = %agent_id, summary = %plan.summary(), "Dry run, nothing written");
        return Ok(ApplyResult {
            plan,
            backups_dir: None,
        });
    }

    let root = absolute_root(root)?;
    let mut backups = BackupSession::new(&root);
    let agent = ledger.ensure_agent(agent_id);
    agent.pack = pack.clone();

    for entry in &plan.entries {
        match entry.action {
            Action::Create | Action::Update | Action::Overwrite => {
                let file = working_set.get(&entry.path).ok_or_else(|| Error::Internal {
                    message: format!("desired file missing for planned path {}", entry.path),
                })?;
                write_file(&root, entry, file, agent, &mut backups, reader)?;
            }
            Action::Delete => delete_file(&root, entry, agent, &mut backups, reader)?,
            Action::Skip | Action::Conflict => {}
        }
    }

    tracing::info!(
        agent = %agent_id,
        pack = %pack.id,
        version = %pack.version,
        summary = %plan.summary(),
        "Sync applied"
    );

    Ok(ApplyResult {
        plan,
        backups_dir: backups.into_dir(),
    })
}

fn write_file<R: ContentReader + ?Sized>(
    root: &Path,
    entry: &PlanEntry,
    file: &DesiredFile,
    agent: &mut AgentState,
    backups: &mut BackupSession,
    reader: &R,
) -> Result<()> {
    let abs = safe_abs_path(root, &entry.path)?;

    if entry.action == Action::Overwrite
        && let Some(current) = reader.read(&abs)?
    {
        let copy = backups.store(&entry.path, &current)?;
        tracing::debug!(path = %entry.path, backup = %copy.display(), "Backed up before overwrite");
    }

    if file.mode != MODE_COPY {
        tracing::debug!(
            path = %entry.path,
            mode = %file.mode,
            "Mode not interpreted, writing bytes verbatim"
        );
    }

    io::write_atomic(&abs, &file.bytes)?;
    agent.files.insert(
        entry.path.clone(),
        FileEntry::installed(&file.artifact_id, &file.bytes, &file.mode),
    );
    tracing::debug!(path = %entry.path, action = %entry.action, "Wrote file");
    Ok(())
}

fn delete_file<R: ContentReader + ?Sized>(
    root: &Path,
    entry: &PlanEntry,
    agent: &mut AgentState,
    backups: &mut BackupSession,
    reader: &R,
) -> Result<()> {
    let abs = safe_abs_path(root, &entry.path)?;

    // Best effort: a failed backup never blocks the delete
    match reader.read(&abs) {
        Ok(Some(current)) => {
            if let Err(e) = backups.store(&entry.path, &current) {
                tracing::warn!(path = %entry.path, error = %e, "Backup before delete failed");
            }
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(path = %entry.path, error = %e, "Could not read file for backup"),
    }

    if !io::remove_if_exists(&abs)? {
        tracing::debug!(path = %entry.path, "File already removed");
    }
    agent.files.remove(&entry.path);
    tracing::debug!(path = %entry.path, "Deleted orphan");
    Ok(())
}
