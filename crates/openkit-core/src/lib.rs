//! Reconciliation engine for OpenKit managed files
//!
//! This crate installs a set of desired files into a project and keeps them
//! in sync across runs without clobbering user edits:
//!
//! - **Ledger**: per-agent record of installed files and their content hashes
//! - **Planner**: three-way diff of desired content, disk content and ledger
//! - **Executor**: atomic writes, backups before destructive changes, and
//!   in-place ledger updates
//! - **Check**: drift report of installed files against the ledger
//!
//! # Architecture
//!
//! `openkit-core` sits on top of the filesystem layer:
//!
//! ```text
//!        callers (CLI, installers)
//!                  |
//!             openkit-core
//!       ledger / sync / backup
//!                  |
//!              openkit-fs
//!   paths / atomic io / checksums
//! ```
//!
//! # Example
//!
//! ```no_run
//! use openkit_core::{DesiredFile, PackState, Result, SyncEngine, SyncOptions};
//!
//! fn install() -> Result<()> {
//!     let engine = SyncEngine::new(".")?;
//!     let mut ledger = engine.load_ledger()?;
//!     let desired = vec![DesiredFile::copy(".claude/agents/a.md", "body", "embedded/a.md")];
//!
//!     let result = engine.apply(
//!         "claude",
//!         &PackState::new("starter", "1.0.0"),
//!         &desired,
//!         &mut ledger,
//!         &SyncOptions::default(),
//!     )?;
//!     engine.save_ledger(&ledger)?;
//!     println!("{}", result.plan.summary());
//!     Ok(())
//! }
//! ```

pub mod backup;
pub mod error;
pub mod ledger;
pub mod sync;

pub use backup::BackupSession;
pub use error::{Error, Result};
pub use ledger::{AgentState, FileEntry, Ledger, PackState};
pub use sync::{
    Action, ApplyResult, CheckReport, CheckStatus, ContentReader, DesiredFile, DiskReader,
    DriftItem, Plan, PlanEntry, Reason, SyncEngine, SyncOptions, build_plan, desired_file,
    desired_from_dir,
};
