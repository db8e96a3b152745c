//! Constants and enums for OpenKit project paths.

use std::path::{Path, PathBuf};

/// Well-known locations inside a project managed by OpenKit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KitPath {
    /// The `.openkit` dotfolder holding all engine state
    KitDir,
    /// The ledger file name inside the dotfolder
    Ledger,
    /// The backups directory name inside the dotfolder
    Backups,
}

impl KitPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KitDir => ".openkit",
            Self::Ledger => "managed.json",
            Self::Backups => "backups",
        }
    }

    /// Resolve this location under a project root.
    ///
    /// Entries other than [`KitPath::KitDir`] live inside the dotfolder.
    pub fn under(&self, project_root: &Path) -> PathBuf {
        let kit_dir = project_root.join(Self::KitDir.as_str());
        match self {
            Self::KitDir => kit_dir,
            Self::Ledger | Self::Backups => kit_dir.join(self.as_str()),
        }
    }
}

impl AsRef<Path> for KitPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for KitPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for KitPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_lives_in_dotfolder() {
        let path = KitPath::Ledger.under(Path::new("project"));
        assert_eq!(path, Path::new("project").join(".openkit").join("managed.json"));
    }

    #[test]
    fn kit_dir_is_direct_child_of_root() {
        let path = KitPath::KitDir.under(Path::new("project"));
        assert_eq!(path, Path::new("project").join(".openkit"));
    }
}
