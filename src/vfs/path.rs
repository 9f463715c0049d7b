//! The virtual path algebra: pure, side-effect-free manipulation of absolute
//! slash-delimited paths.
//!
//! Paths here are addresses into the resource namespace, never host
//! locations, so the algebra is self-contained: nothing delegates to
//! `std::path`, whose platform semantics do not apply to this domain.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crate::core::{FsError, Result};

/// The path separator. Paths are case-sensitive; the root is exactly `/`.
pub const SEPARATOR: char = '/';

/// Identity of the filesystem a path was created by.
///
/// Two paths are equal only when both their normalized segments and their
/// store identity match. Paths built with [`VirtualPath::parse`], outside any
/// filesystem, share the detached identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreId(u64);

impl StoreId {
    pub const DETACHED: StoreId = StoreId(0);

    pub(crate) fn next() -> StoreId {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        StoreId(NEXT.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

/// An immutable absolute path value: a `/`-delimited sequence of non-empty
/// segments starting at the root.
///
/// A `VirtualPath` is either exactly the root or a non-empty segment
/// sequence; relative paths cannot be constructed. The raw string is kept as
/// given (so `Display` round-trips the input); equality, hashing and ordering
/// operate over the normalized form.
#[derive(Debug, Clone)]
pub struct VirtualPath {
    raw: String,
    store: StoreId,
}

impl VirtualPath {
    /// Parses an absolute path string, detached from any filesystem.
    /// Fails with `InvalidPath` for the empty string and for any string that
    /// does not start with the separator.
    pub fn parse(path: &str) -> Result<VirtualPath> {
        VirtualPath::with_store(path, StoreId::DETACHED)
    }

    pub(crate) fn with_store(path: &str, store: StoreId) -> Result<VirtualPath> {
        if path.is_empty() {
            return Err(FsError::invalid_path("empty"));
        }
        if !path.starts_with(SEPARATOR) {
            return Err(FsError::invalid_path(format!("must be absolute: {path}")));
        }
        Ok(VirtualPath {
            raw: path.to_string(),
            store,
        })
    }

    /// The detached root path `/`.
    pub fn root() -> VirtualPath {
        VirtualPath::root_with(StoreId::DETACHED)
    }

    pub(crate) fn root_with(store: StoreId) -> VirtualPath {
        VirtualPath {
            raw: String::from("/"),
            store,
        }
    }

    /// The raw string form, exactly as constructed.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn store_id(&self) -> StoreId {
        self.store
    }

    pub fn is_root(&self) -> bool {
        self.normalized_segments().is_empty()
    }

    /// Resolves `.`, `..` and redundant separators over a raw string.
    /// `..` at the root is a no-op rather than an error.
    fn str_segments(path: &str) -> Vec<&str> {
        let mut segments = Vec::new();
        for segment in path.split(SEPARATOR) {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }
        segments
    }

    fn normalized_segments(&self) -> Vec<&str> {
        Self::str_segments(&self.raw)
    }

    fn join_segments(segments: &[&str]) -> String {
        if segments.is_empty() {
            return String::from("/");
        }
        let mut joined = String::new();
        for segment in segments {
            joined.push(SEPARATOR);
            joined.push_str(segment);
        }
        joined
    }

    /// Collapses `.` segments, resolves `..` against the preceding segment
    /// (a no-op at the root), and removes redundant separators.
    ///
    /// Returns a borrow of `self` when already normalized, so callers can
    /// short-circuit cheaply. Idempotent.
    pub fn normalize(&self) -> Cow<'_, VirtualPath> {
        let canonical = Self::join_segments(&self.normalized_segments());
        if canonical == self.raw {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(VirtualPath {
                raw: canonical,
                store: self.store,
            })
        }
    }

    /// Resolves `other` against this path.
    ///
    /// An absolute `other` wins unchanged; a relative `other` is appended to
    /// this path and the concatenation normalized. An empty `other` resolves
    /// to this path's normalized form.
    pub fn resolve(&self, other: &str) -> Result<VirtualPath> {
        if other.starts_with(SEPARATOR) {
            return VirtualPath::with_store(other, self.store);
        }
        let combined = if self.raw == "/" {
            format!("/{other}")
        } else {
            format!("{}/{}", self.raw, other)
        };
        let combined = VirtualPath {
            raw: combined,
            store: self.store,
        };
        Ok(combined.normalize().into_owned())
    }

    /// The relative path `r` such that `self.resolve(&r)` reproduces
    /// `other`'s normalized form. Descendants need no `..` components;
    /// siblings fall back to a common-prefix segment diff. Returns the empty
    /// string when the two paths are equal.
    pub fn relativize(&self, other: &VirtualPath) -> String {
        let base = self.normalized_segments();
        let target = other.normalized_segments();
        let common = base
            .iter()
            .zip(target.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut parts: Vec<&str> = Vec::with_capacity(base.len() - common + target.len() - common);
        for _ in common..base.len() {
            parts.push("..");
        }
        parts.extend(&target[common..]);
        parts.join("/")
    }

    /// The path formed by all but the last segment.
    /// Fails with `InvalidPath` at the root: the root has no parent.
    pub fn parent(&self) -> Result<VirtualPath> {
        let segments = self.normalized_segments();
        if segments.is_empty() {
            return Err(FsError::invalid_path("root has no parent"));
        }
        Ok(VirtualPath {
            raw: Self::join_segments(&segments[..segments.len() - 1]),
            store: self.store,
        })
    }

    /// The last normalized segment; `None` at the root.
    pub fn file_name(&self) -> Option<&str> {
        self.normalized_segments().last().copied()
    }

    /// Number of normalized segments; zero at the root.
    pub fn name_count(&self) -> usize {
        self.normalized_segments().len()
    }

    /// The normalized segment at `index`.
    pub fn name(&self, index: usize) -> Result<&str> {
        let segments = self.normalized_segments();
        segments.get(index).copied().ok_or_else(|| {
            FsError::invalid_path(format!("name index {index} invalid for {}", self.raw))
        })
    }

    /// The `/`-joined relative sequence of normalized segments in
    /// `[begin, end)`. Fails with `InvalidPath` unless
    /// `begin <= end <= name_count()`.
    pub fn subpath(&self, begin: usize, end: usize) -> Result<String> {
        let segments = self.normalized_segments();
        if begin > end || end > segments.len() {
            return Err(FsError::invalid_path(format!(
                "[{begin},{end}] not valid for {}",
                self.raw
            )));
        }
        Ok(segments[begin..end].join("/"))
    }

    /// Segment-boundary-safe prefix test: `/a` is a prefix of `/a/b.txt` but
    /// not of `/ab.txt`. The root is a prefix of everything.
    pub fn starts_with(&self, prefix: &str) -> bool {
        let own = self.normalized_segments();
        let other = Self::str_segments(prefix);
        own.len() >= other.len() && own[..other.len()] == other[..]
    }

    /// Segment-aware suffix test: `b.txt` and `a/b.txt` are suffixes of
    /// `/a/b.txt`, `.txt` is not. An absolute `suffix` matches only the
    /// whole path.
    pub fn ends_with(&self, suffix: &str) -> bool {
        let own = self.normalized_segments();
        let other = Self::str_segments(suffix);
        if suffix.starts_with(SEPARATOR) && own.len() != other.len() {
            return false;
        }
        own.len() >= other.len() && own[own.len() - other.len()..] == other[..]
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for VirtualPath {
    fn eq(&self, other: &Self) -> bool {
        self.store == other.store && self.normalized_segments() == other.normalized_segments()
    }
}

impl Eq for VirtualPath {}

impl Hash for VirtualPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.store.hash(state);
        for segment in self.normalized_segments() {
            segment.hash(state);
        }
    }
}

impl Ord for VirtualPath {
    /// Lexicographic over the normalized path string, store identity as the
    /// tiebreaker (keeps the ordering consistent with equality).
    fn cmp(&self, other: &Self) -> Ordering {
        let own = Self::join_segments(&self.normalized_segments());
        let theirs = Self::join_segments(&other.normalized_segments());
        own.cmp(&theirs).then_with(|| {
            let StoreId(a) = self.store;
            let StoreId(b) = other.store;
            a.cmp(&b)
        })
    }
}

impl PartialOrd for VirtualPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
