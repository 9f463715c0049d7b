//! Directory enumeration over the resource index.
//!
//! No directory records exist in the index; directories are synthetic
//! groupings inferred from the path prefixes of leaf resources. An
//! otherwise-empty directory is therefore indistinguishable from a
//! non-existent one.

use crate::core::Result;
use crate::vfs::path::VirtualPath;
use crate::vfs::store::FileStore;

/// A finite, one-shot sequence of the paths below a directory.
///
/// The snapshot is computed eagerly at call time from the cached index, so
/// repeated listings of an unchanged index are stable. Order is the index's
/// scan order, not alphabetical.
pub struct ReadDir {
    entries: std::vec::IntoIter<VirtualPath>,
}

impl ReadDir {
    pub(crate) fn new(store: &FileStore, dir: &VirtualPath) -> Result<ReadDir> {
        let dir = dir.normalize();
        // Boundary-safe prefix: "/a" must not match "/ab.txt".
        let prefix = if dir.is_root() {
            String::from("/")
        } else {
            format!("{}/", dir.as_str())
        };
        let entries = store
            .lookup_prefix(&prefix)?
            .iter()
            .map(|record| VirtualPath::with_store(record.path(), dir.store_id()))
            .collect::<Result<Vec<_>>>()?;
        Ok(ReadDir {
            entries: entries.into_iter(),
        })
    }
}

impl Iterator for ReadDir {
    type Item = VirtualPath;

    fn next(&mut self) -> Option<VirtualPath> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for ReadDir {}
