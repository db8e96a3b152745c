//! Filesystem primitives for OpenKit
//!
//! Provides relative output path validation, root-confined path resolution,
//! atomic writes and SHA-256 content hashing.

pub mod checksum;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use constants::KitPath;
pub use error::{Error, Result};
pub use path::{absolute_root, normalize_rel_output_path, safe_abs_path};
