//! SyncEngine implementation
//!
//! The SyncEngine binds a project root and a content reader to the three
//! operations callers need:
//! - **plan**: compute what a sync would do
//! - **apply**: execute the plan and record the result in the ledger
//! - **check**: compare installed files against the ledger

use std::path::{Path, PathBuf};

use openkit_fs::path::absolute_root;

use super::check::{CheckReport, check_ledger};
use super::desired::DesiredFile;
use super::executor;
use super::plan::{ApplyResult, Plan, SyncOptions};
use super::planner::build_plan;
use super::reader::{ContentReader, DiskReader};
use crate::Result;
use crate::ledger::{Ledger, PackState, ledger_path};

/// Engine for reconciling managed files in one project
///
/// The ledger is never held by the engine. Callers load it, pass it to
/// [`SyncEngine::apply`] and save it afterwards, so a failed apply still
/// leaves them with a ledger describing what was written.
#[derive(Debug, Clone)]
pub struct SyncEngine<R: ContentReader = DiskReader> {
    /// Absolute project root
    root: PathBuf,
    reader: R,
}

impl SyncEngine<DiskReader> {
    /// Create an engine reading the real filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is relative and the current directory
    /// cannot be determined.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        Self::with_reader(root, DiskReader)
    }
}

impl<R: ContentReader> SyncEngine<R> {
    /// Create an engine with a custom content reader.
    ///
    /// # Errors
    ///
    /// Same as [`SyncEngine::new`].
    pub fn with_reader(root: impl AsRef<Path>, reader: R) -> Result<Self> {
        Ok(Self {
            root: absolute_root(root.as_ref())?,
            reader,
        })
    }

    /// Absolute project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the ledger file of this project
    pub fn ledger_path(&self) -> PathBuf {
        ledger_path(&self.root)
    }

    /// Load the ledger from disk, or start an empty one if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger file exists but cannot be read, parsed
    /// or carries an unsupported schema version.
    pub fn load_ledger(&self) -> Result<Ledger> {
        Ledger::load_or_default(&self.ledger_path())
    }

    /// Save the ledger to disk
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be serialized or written.
    pub fn save_ledger(&self, ledger: &Ledger) -> Result<()> {
        ledger.save(&self.ledger_path())?;
        tracing::debug!(path = %self.ledger_path().display(), "Saved managed state");
        Ok(())
    }

    /// Compute the plan for `agent_id` without touching anything.
    ///
    /// # Errors
    ///
    /// Path violations and read failures abort with no partial plan.
    pub fn plan(
        &self,
        agent_id: &str,
        desired: &[DesiredFile],
        ledger: Option<&Ledger>,
        options: &SyncOptions,
    ) -> Result<Plan> {
        build_plan(&self.root, agent_id, desired, ledger, options, &self.reader)
    }

    /// Plan and execute a sync for `agent_id`.
    ///
    /// The ledger is updated in place; the caller saves it once this returns
    /// `Ok`.
    ///
    /// # Errors
    ///
    /// Planning errors leave disk and ledger untouched. Execution errors stop
    /// at the failing entry; earlier writes remain recorded in `ledger`.
    pub fn apply(
        &self,
        agent_id: &str,
        pack: &PackState,
        desired: &[DesiredFile],
        ledger: &mut Ledger,
        options: &SyncOptions,
    ) -> Result<ApplyResult> {
        executor::apply(
            &self.root,
            agent_id,
            pack,
            desired,
            ledger,
            options,
            &self.reader,
        )
    }

    /// Check installed files of `agent_id` against `ledger`.
    ///
    /// # Errors
    ///
    /// Read failures other than "not found" are propagated.
    pub fn check(&self, agent_id: &str, ledger: &Ledger) -> Result<CheckReport> {
        check_ledger(&self.root, agent_id, ledger, &self.reader)
    }

    /// Load the ledger from disk and check `agent_id` against it.
    ///
    /// A ledger that cannot be loaded yields a [`CheckStatus::Broken`]
    /// report rather than an error.
    ///
    /// [`CheckStatus::Broken`]: super::check::CheckStatus::Broken
    ///
    /// # Errors
    ///
    /// Read failures of managed files are propagated.
    pub fn check_installed(&self, agent_id: &str) -> Result<CheckReport> {
        match self.load_ledger() {
            Ok(ledger) => self.check(agent_id, &ledger),
            Err(e) => {
                tracing::warn!(error = %e, "Managed state could not be loaded");
                Ok(CheckReport::broken(format!("Failed to load managed state: {e}")))
            }
        }
    }
}
