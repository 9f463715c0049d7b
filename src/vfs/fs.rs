//! The filesystem facade: one store, one root, path construction, channel
//! opening and directory listing.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::debug;

use crate::core::Result;
use crate::scan::{ResourceScanner, ScanConfig};
use crate::vfs::channel::RandomAccess;
use crate::vfs::path::{StoreId, VirtualPath};
use crate::vfs::read_dir::ReadDir;
use crate::vfs::store::FileStore;

/// A read-only filesystem over one scanned resource collection.
///
/// Paths created through [`ResourceFs::path`] carry this filesystem's store
/// identity, so paths from different filesystems never compare equal even
/// when their strings match.
pub struct ResourceFs {
    id: StoreId,
    store: FileStore,
}

impl ResourceFs {
    /// Creates a filesystem over `scanner`. The configuration is validated
    /// up front; the first path lookup triggers the scan.
    pub fn new(scanner: Arc<dyn ResourceScanner>, config: ScanConfig) -> Result<ResourceFs> {
        config.validate()?;
        Ok(ResourceFs {
            id: StoreId::next(),
            store: FileStore::new(scanner, config),
        })
    }

    pub fn separator(&self) -> &'static str {
        "/"
    }

    pub fn is_read_only(&self) -> bool {
        true
    }

    /// Always true: [`close`](ResourceFs::close) drops the cached index but
    /// leaves the filesystem usable, so it never reaches a dead state.
    pub fn is_open(&self) -> bool {
        true
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// The root path `/`, owned by this filesystem.
    pub fn root(&self) -> VirtualPath {
        VirtualPath::root_with(self.id)
    }

    /// Builds a path owned by this filesystem.
    /// Fails with `InvalidPath` unless `path` is absolute.
    pub fn path(&self, path: &str) -> Result<VirtualPath> {
        VirtualPath::with_store(path, self.id)
    }

    /// Opens a random-access view over the resource at `path`.
    /// The path is normalized before lookup; `NotFound` when no record
    /// matches the normalized form exactly.
    pub fn open(&self, path: &VirtualPath) -> Result<Box<dyn RandomAccess + Send>> {
        let normalized = path.normalize();
        self.store.open_channel(normalized.as_str())
    }

    /// Lists every resource below `dir`; see [`ReadDir`] for semantics.
    pub fn read_dir(&self, dir: &VirtualPath) -> Result<ReadDir> {
        ReadDir::new(&self.store, dir)
    }

    /// Identity of the scanned set backing this filesystem.
    /// Triggers a scan when none has happened yet.
    pub fn identity(&self) -> Result<u64> {
        self.store.identity()
    }

    /// Drops the cached index. The filesystem stays usable: the next access
    /// triggers a fresh scan. Idempotent.
    pub fn close(&self) {
        debug!("closing resource filesystem");
        self.store.reset();
    }
}

impl fmt::Debug for ResourceFs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceFs")
            .field("id", &self.id)
            .field("scanned", &self.store.is_scanned())
            .finish()
    }
}

/// Equality follows the index identity: comparing two filesystems forces
/// their scans. Filesystems whose scans fail compare unequal to everything.
impl PartialEq for ResourceFs {
    fn eq(&self, other: &Self) -> bool {
        match (self.store.identity(), other.store.identity()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl Hash for ResourceFs {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.store.identity().unwrap_or(0).hash(state);
    }
}
