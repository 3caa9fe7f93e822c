//! sift: composable predicate matching and lazy directory walking.
//!
//! Provides:
//! - **Pattern**: boolean-combinable match criteria over a visited path's
//!   name, full string form, root-relative sections, or resolved form
//! - **Search**: lazy depth-first directory walker that evaluates a
//!   `Pattern` per visited entry and yields matching paths on demand
//! - **SearchFs**: minimal read-only filesystem trait the walker is
//!   generic over
//! - **OsFs**: `SearchFs` implementation backed by `std::fs`
//!
//! Patterns compose with `&` (AND), `|` (OR), `!` (NOT) and `-` (AND-NOT),
//! short-circuiting left to right during evaluation.
//!
//! # Examples
//! ```no_run
//! use sift::{Pattern, SearchOptions, search};
//!
//! let pattern = Pattern::by_name(|n| n.ends_with(".py"))
//!     & Pattern::by_sections(|parts| parts.iter().any(|p| p == "tests"));
//!
//! let options = SearchOptions {
//!     recursive: true,
//!     ..Default::default()
//! };
//! for path in search(".", pattern, options)? {
//!     println!("{}", path?.display());
//! }
//! # Ok::<(), sift::SearchError>(())
//! ```

mod entry;
mod osfs;
mod pattern;
mod walker;

pub use entry::Entry;
pub use osfs::OsFs;
pub use pattern::Pattern;
pub use walker::{EntryKinds, Search, SearchOptions, search};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from filesystem operations during a search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("root not found: {0}")]
    RootNotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("symlink cycle detected: {0}")]
    SymlinkCycle(String),
}

/// Minimal read-only filesystem abstraction for the walker.
///
/// Implement this trait to search something other than the host
/// filesystem (an in-memory tree, an archive, a remote mount). [`OsFs`]
/// is the `std::fs`-backed implementation used by [`search`].
pub trait SearchFs {
    /// The directory entry type returned by `list_dir`.
    type DirEntry: SearchDirEntry;

    /// List the entries in a directory.
    fn list_dir(&self, path: &Path) -> Result<Vec<Self::DirEntry>, SearchError>;

    /// Check if a path is a directory, following symlinks.
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if a path is itself a symbolic link.
    fn is_symlink(&self, path: &Path) -> bool;

    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Return the canonical (resolved) path, following symlinks.
    ///
    /// Used for cycle detection when `follow_symlinks` is enabled. The
    /// default returns the path unchanged, which disables detection;
    /// implementations that support symlinks should resolve the path to
    /// its real location.
    fn canonicalize(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }
}

/// A single entry returned by [`SearchFs::list_dir`].
pub trait SearchDirEntry {
    /// The entry name (file or directory name, not full path).
    fn name(&self) -> &str;

    /// True if this entry is a directory, or a symlink to one.
    fn is_dir(&self) -> bool;

    /// True if this entry is a regular file.
    fn is_file(&self) -> bool;

    /// True if this entry is a symbolic link.
    fn is_symlink(&self) -> bool;
}
