//! Composable match criteria over path-derived fields.
//!
//! A [`Pattern`] wraps a caller-supplied predicate over one field of a
//! visited entry (name, full string form, root-relative sections, resolved
//! path) and composes with `&`, `|`, `!` and `-` into boolean trees of
//! arbitrary depth. Evaluation short-circuits left to right.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not, Sub};
use std::path::Path;
use std::sync::Arc;

use crate::entry::Entry;

type StrPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;
type SectionsPredicate = Arc<dyn Fn(&[String]) -> bool + Send + Sync>;
type PathPredicate = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

/// A boolean-valued test over a visited entry's path-derived fields.
///
/// Built from one of four primitive constructors ([`by_name`],
/// [`by_full_path`], [`by_sections`], [`by_resolved_path`]) and combined
/// with [`and`], [`or`], [`negate`] and [`diff`], or equivalently with the
/// `&`, `|`, `!` and `-` operators.
///
/// Patterns are immutable: combinators build new trees and never mutate
/// their operands, so a pattern can be cloned and reused across searches.
/// Cloning is cheap (the wrapped predicates are reference-counted).
///
/// [`by_name`]: Pattern::by_name
/// [`by_full_path`]: Pattern::by_full_path
/// [`by_sections`]: Pattern::by_sections
/// [`by_resolved_path`]: Pattern::by_resolved_path
/// [`and`]: Pattern::and
/// [`or`]: Pattern::or
/// [`negate`]: Pattern::negate
/// [`diff`]: Pattern::diff
///
/// # Examples
/// ```
/// use sift::Pattern;
///
/// let python = Pattern::by_name(|n| n.ends_with(".py"));
/// let in_tests = Pattern::by_sections(|parts| parts.iter().any(|p| p == "tests"));
///
/// // Python files outside any tests directory.
/// let pattern = python - in_tests;
/// ```
#[derive(Clone)]
pub struct Pattern {
    kind: Kind,
}

#[derive(Clone)]
enum Kind {
    Name(StrPredicate),
    Full(StrPredicate),
    Sections(SectionsPredicate),
    Resolved(PathPredicate),
    And(Box<Pattern>, Box<Pattern>),
    Or(Box<Pattern>, Box<Pattern>),
    Not(Box<Pattern>),
}

impl Pattern {
    /// Match on the final name component of the visited entry.
    ///
    /// # Examples
    /// ```
    /// use sift::Pattern;
    ///
    /// let jpegs = Pattern::by_name(|n| n.ends_with(".jpg") || n.ends_with(".jpeg"));
    /// ```
    pub fn by_name<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            kind: Kind::Name(Arc::new(predicate)),
        }
    }

    /// Match on the full path rendered as a string.
    ///
    /// The string is the resolved (absolute) path with `/` separators
    /// regardless of platform.
    ///
    /// # Examples
    /// ```
    /// use sift::Pattern;
    ///
    /// let under_src = Pattern::by_full_path(|p| p.contains("/src/"));
    /// ```
    pub fn by_full_path<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            kind: Kind::Full(Arc::new(predicate)),
        }
    }

    /// Match on the ordered path components relative to the search root.
    ///
    /// # Examples
    /// ```
    /// use sift::Pattern;
    ///
    /// let in_tests = Pattern::by_sections(|parts| parts.iter().any(|p| p == "tests"));
    /// ```
    pub fn by_sections<F>(predicate: F) -> Self
    where
        F: Fn(&[String]) -> bool + Send + Sync + 'static,
    {
        Self {
            kind: Kind::Sections(Arc::new(predicate)),
        }
    }

    /// Match on the resolved (absolute) path.
    ///
    /// # Examples
    /// ```
    /// use sift::Pattern;
    ///
    /// let has_ext = Pattern::by_resolved_path(|p| p.extension().is_some());
    /// ```
    pub fn by_resolved_path<F>(predicate: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        Self {
            kind: Kind::Resolved(Arc::new(predicate)),
        }
    }

    /// Both patterns must match. Also available as the `&` operator.
    pub fn and(self, other: Pattern) -> Pattern {
        Pattern {
            kind: Kind::And(Box::new(self), Box::new(other)),
        }
    }

    /// Either pattern may match. Also available as the `|` operator.
    pub fn or(self, other: Pattern) -> Pattern {
        Pattern {
            kind: Kind::Or(Box::new(self), Box::new(other)),
        }
    }

    /// Invert this pattern. Also available as the `!` operator.
    pub fn negate(self) -> Pattern {
        Pattern {
            kind: Kind::Not(Box::new(self)),
        }
    }

    /// Match `self` but not `other`. Also available as the `-` operator.
    ///
    /// `p.diff(q)` is exactly `p & !q`; unlike `and` and `or` it is not
    /// commutative.
    pub fn diff(self, other: Pattern) -> Pattern {
        self.and(other.negate())
    }

    /// Evaluate this pattern against a single entry.
    ///
    /// Structural recursion with left-to-right short-circuiting: in
    /// `p & q`, `q` is not consulted when `p` already failed, and in
    /// `p | q`, `q` is not consulted when `p` already matched. The order
    /// is part of the contract — a recording or panicking predicate
    /// observes it, and a panic propagates to the caller.
    pub fn matches(&self, entry: &Entry) -> bool {
        match &self.kind {
            Kind::Name(predicate) => predicate(entry.name()),
            Kind::Full(predicate) => predicate(entry.full_path()),
            Kind::Sections(predicate) => predicate(entry.sections()),
            Kind::Resolved(predicate) => predicate(entry.resolved()),
            Kind::And(lhs, rhs) => lhs.matches(entry) && rhs.matches(entry),
            Kind::Or(lhs, rhs) => lhs.matches(entry) || rhs.matches(entry),
            Kind::Not(inner) => !inner.matches(entry),
        }
    }
}

impl BitAnd for Pattern {
    type Output = Pattern;

    fn bitand(self, rhs: Pattern) -> Pattern {
        self.and(rhs)
    }
}

impl BitOr for Pattern {
    type Output = Pattern;

    fn bitor(self, rhs: Pattern) -> Pattern {
        self.or(rhs)
    }
}

impl Not for Pattern {
    type Output = Pattern;

    fn not(self) -> Pattern {
        self.negate()
    }
}

impl Sub for Pattern {
    type Output = Pattern;

    fn sub(self, rhs: Pattern) -> Pattern {
        self.diff(rhs)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Name(_) => f.write_str("by_name(..)"),
            Kind::Full(_) => f.write_str("by_full_path(..)"),
            Kind::Sections(_) => f.write_str("by_sections(..)"),
            Kind::Resolved(_) => f.write_str("by_resolved_path(..)"),
            Kind::And(lhs, rhs) => write!(f, "({lhs:?} & {rhs:?})"),
            Kind::Or(lhs, rhs) => write!(f, "({lhs:?} | {rhs:?})"),
            Kind::Not(inner) => write!(f, "!{inner:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn entry(path: &str, name: &str, sections: &[&str]) -> Entry {
        Entry::new(path, name, sections.iter().map(|s| s.to_string()).collect())
    }

    fn yes() -> Pattern {
        Pattern::by_name(|_| true)
    }

    fn no() -> Pattern {
        Pattern::by_name(|_| false)
    }

    #[test]
    fn primitives_see_their_field() {
        let e = entry("/root/tests/c.py", "c.py", &["tests", "c.py"]);

        assert!(Pattern::by_name(|n| n == "c.py").matches(&e));
        assert!(!Pattern::by_name(|n| n == "a.py").matches(&e));

        assert!(Pattern::by_sections(|parts| parts.iter().any(|p| p == "tests")).matches(&e));
        assert!(!Pattern::by_sections(|parts| parts.is_empty()).matches(&e));

        assert!(Pattern::by_full_path(|p| p.contains("tests")).matches(&e));
        assert!(Pattern::by_full_path(|p| p.contains('/')).matches(&e));

        assert!(Pattern::by_resolved_path(|p| p.is_absolute()).matches(&e));
        assert!(Pattern::by_resolved_path(|p| p.ends_with("c.py")).matches(&e));
    }

    #[test]
    fn and_or_diff_agree_with_boolean_ops() {
        let e = entry("/x", "x", &["x"]);
        for lhs in [false, true] {
            for rhs in [false, true] {
                let p = || if lhs { yes() } else { no() };
                let q = || if rhs { yes() } else { no() };

                assert_eq!((p() & q()).matches(&e), lhs && rhs);
                assert_eq!((p() | q()).matches(&e), lhs || rhs);
                assert_eq!((p() - q()).matches(&e), lhs && !rhs);
                assert_eq!((!p()).matches(&e), !lhs);
            }
        }
    }

    #[test]
    fn double_negation_is_identity() {
        let e = entry("/x/a.py", "a.py", &["a.py"]);
        for base in [yes(), no(), Pattern::by_name(|n| n.ends_with(".py"))] {
            let doubled = !!base.clone();
            assert_eq!(doubled.matches(&e), base.matches(&e));
        }
    }

    #[test]
    fn operators_match_named_methods() {
        let e = entry("/x", "x", &["x"]);
        assert_eq!((yes() & no()).matches(&e), yes().and(no()).matches(&e));
        assert_eq!((yes() | no()).matches(&e), yes().or(no()).matches(&e));
        assert_eq!((yes() - no()).matches(&e), yes().diff(no()).matches(&e));
        assert_eq!((!yes()).matches(&e), yes().negate().matches(&e));
    }

    #[test]
    fn and_short_circuits_on_false_left() {
        let e = entry("/x", "x", &["x"]);
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let right = Pattern::by_name(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            true
        });

        assert!(!(no() & right.clone()).matches(&e));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!((yes() & right).matches(&e));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn or_short_circuits_on_true_left() {
        let e = entry("/x", "x", &["x"]);
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let right = Pattern::by_name(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            false
        });

        assert!((yes() | right.clone()).matches(&e));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(!(no() | right).matches(&e));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn diff_short_circuits_like_and() {
        let e = entry("/x", "x", &["x"]);
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let right = Pattern::by_name(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            false
        });

        assert!(!(no() - right).matches(&e));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn tautology_absorbs_or() {
        let e = entry("/x/b.txt", "b.txt", &["b.txt"]);
        let tautology = Pattern::by_full_path(|_| true);
        assert!((tautology.clone() | no()).matches(&e));
        assert!((tautology | Pattern::by_name(|n| n.ends_with(".py"))).matches(&e));
    }

    #[test]
    fn clone_reuses_the_same_predicates() {
        let e_py = entry("/x/a.py", "a.py", &["a.py"]);
        let e_txt = entry("/x/b.txt", "b.txt", &["b.txt"]);
        let python = Pattern::by_name(|n| n.ends_with(".py"));
        let composed = python.clone() & Pattern::by_sections(|_| true);

        assert!(python.matches(&e_py));
        assert!(composed.matches(&e_py));
        assert!(!composed.matches(&e_txt));
    }

    #[test]
    fn debug_shows_tree_shape() {
        let p = Pattern::by_name(|_| true) & !Pattern::by_sections(|_| false);
        let rendered = format!("{p:?}");
        assert_eq!(rendered, "(by_name(..) & !by_sections(..))");
    }
}
