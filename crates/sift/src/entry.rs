//! Per-visit evaluation record.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

/// The path-derived fields a [`Pattern`](crate::Pattern) can test,
/// computed for one visited filesystem object.
///
/// The resolved path and the full string form are computed lazily and
/// cached, so they are paid for at most once per entry — and not at all
/// by a search whose pattern never consults them.
#[derive(Debug)]
pub struct Entry {
    path: PathBuf,
    name: String,
    sections: Vec<String>,
    resolved: OnceCell<PathBuf>,
    full: OnceCell<String>,
}

impl Entry {
    /// Build an entry directly.
    ///
    /// The walker does this for every visited object; constructing one by
    /// hand is mainly useful for evaluating patterns outside a search.
    /// `sections` are the path components relative to the search root.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, sections: Vec<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            sections,
            resolved: OnceCell::new(),
            full: OnceCell::new(),
        }
    }

    /// The path as walked (the search root joined with the relative path).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The final name component.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordered path components relative to the search root.
    ///
    /// Empty for the root itself.
    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    /// The resolved (absolute) form of the path.
    ///
    /// Does not touch the filesystem and does not resolve symlinks; a path
    /// that cannot be made absolute is returned as-is.
    pub fn resolved(&self) -> &Path {
        self.resolved
            .get_or_init(|| std::path::absolute(&self.path).unwrap_or_else(|_| self.path.clone()))
    }

    /// The resolved path rendered as a string.
    ///
    /// Unix-style `/` separators are used regardless of platform.
    pub fn full_path(&self) -> &str {
        self.full.get_or_init(|| unix_path_string(self.resolved()))
    }

    /// Consume the entry, yielding its resolved path.
    pub(crate) fn into_resolved(self) -> PathBuf {
        let Entry { path, resolved, .. } = self;
        resolved
            .into_inner()
            .unwrap_or_else(|| std::path::absolute(&path).unwrap_or(path))
    }
}

/// Render a path with `/` separators regardless of platform.
fn unix_path_string(path: &Path) -> String {
    let rendered = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        rendered.into_owned()
    } else {
        rendered.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_return_constructed_fields() {
        let e = Entry::new(
            "/root/tests/c.py",
            "c.py",
            vec!["tests".to_string(), "c.py".to_string()],
        );
        assert_eq!(e.path(), Path::new("/root/tests/c.py"));
        assert_eq!(e.name(), "c.py");
        assert_eq!(e.sections(), ["tests", "c.py"]);
    }

    #[test]
    fn root_entry_has_no_sections() {
        let e = Entry::new("/root", "root", Vec::new());
        assert!(e.sections().is_empty());
    }

    #[test]
    fn resolved_is_absolute() {
        let absolute = Entry::new("/root/a.py", "a.py", vec!["a.py".to_string()]);
        assert_eq!(absolute.resolved(), Path::new("/root/a.py"));

        let relative = Entry::new("rel/a.py", "a.py", vec!["a.py".to_string()]);
        assert!(relative.resolved().is_absolute());
        assert!(relative.resolved().ends_with("rel/a.py"));
    }

    #[test]
    fn full_path_uses_forward_slashes() {
        let e = Entry::new("/root/tests/c.py", "c.py", Vec::new());
        assert_eq!(e.full_path(), "/root/tests/c.py");
        assert!(!e.full_path().contains('\\'));
    }

    #[test]
    fn full_path_is_computed_once() {
        let e = Entry::new("/root/a.py", "a.py", Vec::new());
        // Same allocation on both calls proves the cache is hit.
        assert_eq!(e.full_path().as_ptr(), e.full_path().as_ptr());
        assert_eq!(e.resolved() as *const Path, e.resolved() as *const Path);
    }

    #[test]
    fn into_resolved_matches_resolved() {
        let e = Entry::new("rel/a.py", "a.py", Vec::new());
        let expected = e.resolved().to_path_buf();
        assert_eq!(e.into_resolved(), expected);

        let untouched = Entry::new("rel/b.py", "b.py", Vec::new());
        assert!(untouched.into_resolved().is_absolute());
    }
}
