//! Lazy depth-first directory walking driven by a [`Pattern`].
//!
//! [`Search`] walks a root directory, builds an [`Entry`] per visited
//! object, evaluates the pattern against it, and yields the resolved path
//! of every match. Work and I/O happen only as the iterator is pulled: at
//! most one directory listing is buffered ahead of the consumer, so a
//! caller that stops after the first match never walks the rest of the
//! tree.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::entry::Entry;
use crate::osfs::OsFs;
use crate::pattern::Pattern;
use crate::{SearchDirEntry, SearchError, SearchFs};

/// Kinds of entries eligible for matching and yielding.
///
/// Directories are always descended into when recursion allows it,
/// independent of whether directories themselves are candidates here.
#[derive(Debug, Clone, Copy)]
pub struct EntryKinds {
    /// Regular files are candidates.
    pub files: bool,
    /// Directories are candidates.
    pub dirs: bool,
}

impl EntryKinds {
    /// Only files are candidates (the default).
    pub fn files_only() -> Self {
        Self {
            files: true,
            dirs: false,
        }
    }

    /// Only directories are candidates.
    pub fn dirs_only() -> Self {
        Self {
            files: false,
            dirs: true,
        }
    }

    /// Both files and directories are candidates.
    pub fn all() -> Self {
        Self {
            files: true,
            dirs: true,
        }
    }
}

impl Default for EntryKinds {
    fn default() -> Self {
        Self::files_only()
    }
}

/// Options for a search.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Descend into subdirectories. When false, only direct children of
    /// the root are visited. Default `false`.
    pub recursive: bool,
    /// When recursive, list directories only down to this depth below the
    /// root (`None` = unlimited). Default `None`.
    pub max_depth: Option<usize>,
    /// Which entry kinds are candidates for matching and yielding.
    /// Default files only.
    pub kinds: EntryKinds,
    /// Visit entries whose name starts with a dot. When false, hidden
    /// directories are not descended into either. Default `true`.
    pub include_hidden: bool,
    /// Follow symbolic links, with cycle detection. When false, symlinked
    /// entries are skipped entirely. Default `false`.
    pub follow_symlinks: bool,
    /// Treat a missing root as an empty search rather than an error.
    /// Default `true`.
    pub missing_ok: bool,
    /// Log and skip unreadable directories instead of yielding an error
    /// and stopping. Default `false`.
    pub skip_errors: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            max_depth: None,
            kinds: EntryKinds::files_only(),
            include_hidden: true,
            follow_symlinks: false,
            missing_ok: true,
            skip_errors: false,
        }
    }
}

/// A directory entry lifted out of a listing, with the fields the walk
/// needs after the listing itself is gone.
struct ListedEntry {
    path: PathBuf,
    name: String,
    is_dir: bool,
    is_symlink: bool,
}

/// Lazy depth-first walk of a directory tree, yielding the resolved path
/// of every entry the pattern matches.
///
/// Each directory's listing is sorted by name, so traversal order is
/// deterministic: alphabetical within a directory, depth-first across
/// directories. The iterator is single-pass; to restart a search, build a
/// new one.
///
/// Errors surface as `Err` items. By default the first error ends the
/// walk (the iterator yields nothing further); with
/// [`SearchOptions::skip_errors`] the walk logs and continues.
///
/// # Examples
/// ```no_run
/// use sift::{OsFs, Pattern, Search, SearchOptions};
///
/// let fs = OsFs;
/// let matches = Search::new(&fs, "/var/log", Pattern::by_name(|n| n.ends_with(".log")))
///     .with_options(SearchOptions {
///         recursive: true,
///         ..Default::default()
///     });
/// for path in matches {
///     println!("{}", path?.display());
/// }
/// # Ok::<(), sift::SearchError>(())
/// ```
pub struct Search<'a, F: SearchFs> {
    fs: &'a F,
    root: PathBuf,
    pattern: Pattern,
    options: SearchOptions,
    started: bool,
    done: bool,
    /// Depth of the directory currently being drained (root = 0).
    depth: usize,
    /// Remaining entries of the directory currently being drained.
    current: std::vec::IntoIter<ListedEntry>,
    /// Subdirectories collected while draining, flushed when it is done.
    subdirs: Vec<(PathBuf, usize)>,
    /// Directories awaiting listing, popped LIFO for depth-first order.
    pending: Vec<(PathBuf, usize)>,
    /// Canonical paths of directories entered while following symlinks.
    visited: HashSet<PathBuf>,
}

impl<'a, F: SearchFs> Search<'a, F> {
    /// Create a search of `root` for entries matching `pattern`.
    pub fn new(fs: &'a F, root: impl AsRef<Path>, pattern: Pattern) -> Self {
        Self {
            fs,
            root: root.as_ref().to_path_buf(),
            pattern,
            options: SearchOptions::default(),
            started: false,
            done: false,
            depth: 0,
            current: Vec::new().into_iter(),
            subdirs: Vec::new(),
            pending: Vec::new(),
            visited: HashSet::new(),
        }
    }

    /// Set search options.
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Classify the root and seed the walk. A root that is a regular file
    /// is itself a candidate; a missing root is empty or an error per
    /// `missing_ok`.
    fn enter_root(&mut self) -> Option<Result<PathBuf, SearchError>> {
        let root = self.root.clone();
        if !self.fs.exists(&root) {
            self.done = true;
            if self.options.missing_ok {
                tracing::debug!("search root {} does not exist, yielding nothing", root.display());
                return None;
            }
            return Some(Err(SearchError::RootNotFound(root.display().to_string())));
        }
        if self.fs.is_symlink(&root) && !self.options.follow_symlinks {
            self.done = true;
            return None;
        }
        if self.fs.is_dir(&root) {
            if self.options.follow_symlinks {
                self.visited.insert(self.fs.canonicalize(&root));
            }
            self.pending.push((root.clone(), 0));
            if self.options.kinds.dirs {
                return self.evaluate(root);
            }
            None
        } else {
            self.done = true;
            if self.options.kinds.files {
                return self.evaluate(root);
            }
            None
        }
    }

    /// Apply the hidden/symlink policies to one listed entry, queue
    /// descent if it is a directory, and evaluate it if it is a candidate.
    fn visit(&mut self, entry: ListedEntry) -> Option<Result<PathBuf, SearchError>> {
        if !self.options.include_hidden && entry.name.starts_with('.') {
            return None;
        }
        if entry.is_symlink && !self.options.follow_symlinks {
            return None;
        }
        if entry.is_dir {
            if entry.is_symlink {
                // Recursing through a link needs cycle detection on the
                // canonical directory.
                let canonical = self.fs.canonicalize(&entry.path);
                if !self.visited.insert(canonical) {
                    if self.options.skip_errors {
                        tracing::warn!("skipping symlink cycle at {}", entry.path.display());
                        return None;
                    }
                    self.done = true;
                    return Some(Err(SearchError::SymlinkCycle(
                        entry.path.display().to_string(),
                    )));
                }
            }
            if self.descend_allowed(self.depth + 1) {
                self.subdirs.push((entry.path.clone(), self.depth + 1));
            }
            if self.options.kinds.dirs {
                return self.evaluate(entry.path);
            }
            None
        } else if self.options.kinds.files {
            self.evaluate(entry.path)
        } else {
            None
        }
    }

    /// Build the [`Entry`] for a candidate and run the pattern.
    fn evaluate(&self, path: PathBuf) -> Option<Result<PathBuf, SearchError>> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let sections = self.sections_of(&path);
        let entry = Entry::new(path, name, sections);
        if self.pattern.matches(&entry) {
            Some(Ok(entry.into_resolved()))
        } else {
            None
        }
    }

    fn sections_of(&self, path: &Path) -> Vec<String> {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect()
    }

    /// May a directory at `depth` below the root be listed?
    fn descend_allowed(&self, depth: usize) -> bool {
        if !self.options.recursive {
            return false;
        }
        self.options.max_depth.is_none_or(|max| depth <= max)
    }
}

impl<F: SearchFs> Iterator for Search<'_, F> {
    type Item = Result<PathBuf, SearchError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            if let Some(item) = self.enter_root() {
                return Some(item);
            }
            if self.done {
                return None;
            }
        }
        loop {
            while let Some(listed) = self.current.next() {
                if let Some(item) = self.visit(listed) {
                    return Some(item);
                }
            }

            // The listing is drained; flush its subdirectories in reverse
            // so the alphabetically-first one is popped next.
            self.subdirs.reverse();
            self.pending.append(&mut self.subdirs);

            let (dir, depth) = self.pending.pop()?;
            match self.fs.list_dir(&dir) {
                Ok(entries) => {
                    let mut listed: Vec<ListedEntry> = entries
                        .into_iter()
                        .map(|e| ListedEntry {
                            path: dir.join(e.name()),
                            name: e.name().to_string(),
                            is_dir: e.is_dir(),
                            is_symlink: e.is_symlink(),
                        })
                        .collect();
                    listed.sort_by(|a, b| a.name.cmp(&b.name));
                    self.current = listed.into_iter();
                    self.depth = depth;
                }
                Err(err) if self.options.skip_errors => {
                    tracing::warn!("skipping unreadable directory {}: {}", dir.display(), err);
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

static OS_FS: OsFs = OsFs;

/// Search the host filesystem under `root` for entries matching `pattern`.
///
/// A leading `~` in `root` is expanded to the user's home directory. With
/// the default options only direct children of the root are visited and a
/// missing root yields an empty search; with `missing_ok` unset a missing
/// root is reported here, before the iterator is returned.
///
/// # Examples
/// ```no_run
/// use sift::{Pattern, SearchOptions, search};
///
/// let python = Pattern::by_name(|n| n.ends_with(".py"));
/// for path in search("~/projects", python, SearchOptions::default())? {
///     println!("{}", path?.display());
/// }
/// # Ok::<(), sift::SearchError>(())
/// ```
pub fn search(
    root: impl AsRef<Path>,
    pattern: Pattern,
    options: SearchOptions,
) -> Result<Search<'static, OsFs>, SearchError> {
    let root = expand_user(root.as_ref());
    if !root.exists() && !options.missing_ok {
        return Err(SearchError::RootNotFound(root.display().to_string()));
    }
    Ok(Search::new(&OS_FS, root, pattern).with_options(options))
}

/// Expand a leading `~` component to the user's home directory.
fn expand_user(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}
