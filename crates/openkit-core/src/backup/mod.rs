//! Pre-overwrite and pre-delete backups
//!
//! Each apply gets its own timestamped directory under
//! `.openkit/backups/<UTC RFC3339, ':' replaced by '-'>/`, mirroring the
//! project tree. The directory is only created once something is backed up.

mod session;

pub use session::{BackupSession, backup_stamp};
