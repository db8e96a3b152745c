//! Content reading seam for the planner
//!
//! Planning only needs "what bytes are at this path, if any". Keeping that
//! behind a trait lets the three-way diff run against an in-memory snapshot.

use openkit_fs::io;
use std::path::Path;

/// Source of current on-disk content.
pub trait ContentReader {
    /// Read the bytes at an absolute path.
    ///
    /// Returns `Ok(None)` when nothing exists there. Every other failure is an
    /// error and aborts planning.
    fn read(&self, path: &Path) -> openkit_fs::Result<Option<Vec<u8>>>;
}

/// Reads the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskReader;

impl ContentReader for DiskReader {
    fn read(&self, path: &Path) -> openkit_fs::Result<Option<Vec<u8>>> {
        io::read_optional(path)
    }
}

impl<R: ContentReader + ?Sized> ContentReader for &R {
    fn read(&self, path: &Path) -> openkit_fs::Result<Option<Vec<u8>>> {
        (**self).read(path)
    }
}
