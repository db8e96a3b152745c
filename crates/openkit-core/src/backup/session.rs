//! Backup session implementation

use crate::Result;
use crate::ledger::now_utc;
use chrono::{DateTime, SecondsFormat, Utc};
use openkit_fs::{KitPath, io};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Backup directory scoped to a single apply.
///
/// The timestamped directory name is fixed the first time a file is stored
/// and the directory is created at most once. Each session claims a
/// directory of its own, so backups of separate applies never mix.
#[derive(Debug)]
pub struct BackupSession {
    /// `.openkit/backups` of the project being synced
    backups_root: PathBuf,
    dir: Option<PathBuf>,
}

impl BackupSession {
    /// Start a session for the project rooted at `project_root`.
    ///
    /// Nothing is created on disk until [`BackupSession::store`] is called.
    pub fn new(project_root: &Path) -> Self {
        Self {
            backups_root: KitPath::Backups.under(project_root),
            dir: None,
        }
    }

    /// The directory used by this session, if any backup was taken
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Consume the session, returning the directory used, if any
    pub fn into_dir(self) -> Option<PathBuf> {
        self.dir
    }

    fn ensure_dir(&mut self) -> Result<PathBuf> {
        if let Some(dir) = &self.dir {
            return Ok(dir.clone());
        }
        fs::create_dir_all(&self.backups_root)
            .map_err(|e| openkit_fs::Error::io(&self.backups_root, e))?;
        let dir = claim_dir(&self.backups_root, &backup_stamp(now_utc()))?;
        tracing::debug!(dir = %dir.display(), "Created backup directory");
        self.dir = Some(dir.clone());
        Ok(dir)
    }

    /// Copy `content` to the backup location mirroring `rel_path`.
    ///
    /// `rel_path` must already be a normalized output path.
    ///
    /// # Returns
    /// The absolute path of the backup copy
    pub fn store(&mut self, rel_path: &str, content: &[u8]) -> Result<PathBuf> {
        let mut dest = self.ensure_dir()?;
        for segment in rel_path.split('/') {
            dest.push(segment);
        }
        io::write_atomic(&dest, content)?;
        Ok(dest)
    }
}

/// Create a directory under `parent` that no earlier session owns.
///
/// Sessions started within the same second share a stamp; later ones get a
/// `-1`, `-2`, ... suffix.
fn claim_dir(parent: &Path, stamp: &str) -> Result<PathBuf> {
    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            stamp.to_string()
        } else {
            format!("{stamp}-{attempt}")
        };
        let dir = parent.join(name);
        match fs::create_dir(&dir) {
            Ok(()) => return Ok(dir),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(openkit_fs::Error::io(&dir, e).into()),
        }
    }
}

/// Directory name for a backup taken at `at`: RFC3339 in UTC with second
/// precision, colons replaced so the name is valid on every platform.
pub fn backup_stamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true).replace(':', "-")
}
