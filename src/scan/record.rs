//! Resource records and the materialized output of one scan.

use std::collections::HashMap;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::io::{self, Cursor, Read};
use std::sync::Arc;

type Opener = Arc<dyn Fn() -> io::Result<Box<dyn Read + Send>> + Send + Sync>;

/// One scanned item: an absolute slash-delimited path, a byte count, and a
/// capability to open a fresh readable stream over the content.
///
/// Records are immutable once produced by a scan. `Clone` is cheap: the
/// opener is shared behind an `Arc`.
#[derive(Clone)]
pub struct ResourceRecord {
    path: String,
    len: u64,
    opener: Opener,
}

impl ResourceRecord {
    /// Creates a record from a path, a known length and an opener closure.
    /// Every call to `open()` must yield a fresh stream positioned at byte 0.
    pub fn new<F>(path: impl Into<String>, len: u64, opener: F) -> ResourceRecord
    where
        F: Fn() -> io::Result<Box<dyn Read + Send>> + Send + Sync + 'static,
    {
        ResourceRecord {
            path: path.into(),
            len,
            opener: Arc::new(opener),
        }
    }

    /// Convenience constructor over an in-memory byte blob.
    pub fn from_bytes(path: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> ResourceRecord {
        let bytes: Arc<[u8]> = bytes.into();
        let len = bytes.len() as u64;
        ResourceRecord::new(path, len, move || {
            Ok(Box::new(Cursor::new(bytes.clone())) as Box<dyn Read + Send>)
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Opens a fresh readable stream over the resource content.
    pub fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        (self.opener)()
    }
}

impl fmt::Debug for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRecord")
            .field("path", &self.path)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// The materialized result of one scan: records in scan order, a path lookup
/// map, and an identity value computed once at construction.
///
/// More than one record can share a path when scanned containers overlap;
/// lookups return all of them in scan order. Immutable after construction.
pub struct ResourceIndex {
    records: Vec<ResourceRecord>,
    by_path: HashMap<String, Vec<usize>>,
    identity: u64,
}

impl ResourceIndex {
    pub fn new(records: Vec<ResourceRecord>) -> ResourceIndex {
        let mut by_path: HashMap<String, Vec<usize>> = HashMap::new();
        let mut hasher = DefaultHasher::new();
        for (i, record) in records.iter().enumerate() {
            record.path.hash(&mut hasher);
            record.len.hash(&mut hasher);
            by_path.entry(record.path.clone()).or_default().push(i);
        }
        ResourceIndex {
            records,
            by_path,
            identity: hasher.finish(),
        }
    }

    /// All records in scan order.
    pub fn all_resources(&self) -> &[ResourceRecord] {
        &self.records
    }

    /// Records whose stored path equals `path` exactly, in scan order.
    /// No normalization is performed; callers must normalize first.
    pub fn resources_with_path(&self, path: &str) -> Vec<ResourceRecord> {
        self.by_path
            .get(path)
            .map(|indices| indices.iter().map(|&i| self.records[i].clone()).collect())
            .unwrap_or_default()
    }

    /// Deterministic identity of the scanned set, derived from the
    /// (path, length) pairs in scan order.
    pub fn identity(&self) -> u64 {
        self.identity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl fmt::Debug for ResourceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceIndex")
            .field("records", &self.records.len())
            .field("identity", &self.identity)
            .finish()
    }
}
