//! `SearchFs` backed by the host filesystem.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::{SearchDirEntry, SearchError, SearchFs};

/// The `std::fs` implementation of [`SearchFs`], used by
/// [`search`](crate::search). Read-only: listing, classification and path
/// resolution, nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

/// A listed entry with its kind resolved up front, so symlinks to
/// directories walk like directories.
#[derive(Debug)]
pub struct OsDirEntry {
    name: String,
    is_dir: bool,
    is_file: bool,
    is_symlink: bool,
}

impl SearchDirEntry for OsDirEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_dir(&self) -> bool {
        self.is_dir
    }

    fn is_file(&self) -> bool {
        self.is_file
    }

    fn is_symlink(&self) -> bool {
        self.is_symlink
    }
}

impl SearchFs for OsFs {
    type DirEntry = OsDirEntry;

    fn list_dir(&self, path: &Path) -> Result<Vec<OsDirEntry>, SearchError> {
        let read_dir = fs::read_dir(path).map_err(|err| listing_error(path, err))?;
        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|err| listing_error(path, err))?;
            let file_type = entry.file_type().map_err(|err| listing_error(path, err))?;
            let is_symlink = file_type.is_symlink();
            let (is_dir, is_file) = if is_symlink {
                // Classify by the link target; a broken link is neither.
                match fs::metadata(entry.path()) {
                    Ok(meta) => (meta.is_dir(), meta.is_file()),
                    Err(_) => (false, false),
                }
            } else {
                (file_type.is_dir(), file_type.is_file())
            };
            entries.push(OsDirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir,
                is_file,
                is_symlink,
            });
        }
        Ok(entries)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        path.is_symlink()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }
}

fn listing_error(path: &Path, err: io::Error) -> SearchError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => SearchError::PermissionDenied(path.display().to_string()),
        _ => SearchError::Io(format!("{}: {}", path.display(), err)),
    }
}
