//! The file store: bridge between the resource scanner and path-based lookup.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::core::{FsError, Result};
use crate::scan::{ResourceIndex, ResourceRecord, ResourceScanner, ScanConfig};
use crate::vfs::channel::{BufferedChannel, RandomAccess, StreamingChannel};

/// Owns one lazily-built [`ResourceIndex`] and exposes exact-path and prefix
/// lookup over it.
///
/// The index is the one contended resource: concurrent first callers race to
/// scan, and a single winner is retained behind the lock — a losing scan is
/// discarded, never merged. Readers that observe an already-set index never
/// block on a scan. The store's identity is the index identity, computed once
/// with the index and cached alongside it.
pub struct FileStore {
    scanner: Arc<dyn ResourceScanner>,
    config: ScanConfig,
    index: RwLock<Option<Arc<ResourceIndex>>>,
}

impl FileStore {
    pub fn new(scanner: Arc<dyn ResourceScanner>, config: ScanConfig) -> FileStore {
        FileStore {
            scanner,
            config,
            index: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn store_type(&self) -> &'static str {
        "resource"
    }

    pub fn is_read_only(&self) -> bool {
        true
    }

    /// A printable store name derived from the index identity.
    /// Triggers a scan when none has happened yet.
    pub fn name(&self) -> Result<String> {
        Ok(format!("resource-filestore-{:016x}", self.identity()?))
    }

    /// Whether an index is currently materialized.
    pub fn is_scanned(&self) -> bool {
        self.index.read().is_some()
    }

    /// Returns the cached index, invoking the scanner to build one first if
    /// necessary. A scan failure aborts the call; a later call retries.
    pub fn ensure_scanned(&self) -> Result<Arc<ResourceIndex>> {
        if let Some(index) = self.index.read().as_ref() {
            return Ok(Arc::clone(index));
        }
        debug!("no resource index present, scanning");
        // Scan outside the write lock so readers of an already-set index are
        // never blocked behind a slow scanner.
        let fresh = Arc::new(self.scanner.scan(&self.config)?);
        let mut guard = self.index.write();
        match guard.as_ref() {
            Some(winner) => {
                trace!("discarding scan that lost the registration race");
                Ok(Arc::clone(winner))
            }
            None => {
                *guard = Some(Arc::clone(&fresh));
                Ok(fresh)
            }
        }
    }

    /// Stable identity of the scanned set; equal stores hold equal sets.
    pub fn identity(&self) -> Result<u64> {
        Ok(self.ensure_scanned()?.identity())
    }

    /// Drops the cached index and identity, permitting a future re-scan.
    /// Idempotent.
    pub fn reset(&self) {
        let mut guard = self.index.write();
        if guard.take().is_some() {
            debug!("resource index dropped");
        }
    }

    /// All records whose stored path equals `path` exactly, in scan order.
    /// Callers must normalize first; the store performs no normalization.
    pub fn lookup_exact(&self, path: &str) -> Result<Vec<ResourceRecord>> {
        Ok(self.ensure_scanned()?.resources_with_path(path))
    }

    /// All records whose path starts with `prefix` (raw string-prefix match),
    /// in scan order.
    pub fn lookup_prefix(&self, prefix: &str) -> Result<Vec<ResourceRecord>> {
        let index = self.ensure_scanned()?;
        Ok(index
            .all_resources()
            .iter()
            .filter(|record| record.path().starts_with(prefix))
            .cloned()
            .collect())
    }

    /// Opens a random-access view over the resource at `path` (which must be
    /// in normalized form). When containers contributed duplicate paths, the
    /// first record in scan order wins.
    ///
    /// The strategy is chosen by `len <= max_buffer_size`; the choice is a
    /// performance detail, never observable in the bytes read.
    pub fn open_channel(&self, path: &str) -> Result<Box<dyn RandomAccess + Send>> {
        let records = self.lookup_exact(path)?;
        let Some(record) = records.first() else {
            return Err(FsError::not_found(path));
        };
        if record.len() <= self.config.max_buffer_size {
            trace!(path, len = record.len(), "opening buffered channel");
            Ok(Box::new(BufferedChannel::new(record)?))
        } else {
            trace!(path, len = record.len(), "opening streaming channel");
            Ok(Box::new(StreamingChannel::new(
                record.clone(),
                self.config.chunk_size(),
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::scan::MemoryScanner;

    /// Scanner wrapper that counts completed scans.
    struct CountingScanner {
        inner: MemoryScanner,
        scans: AtomicUsize,
    }

    impl ResourceScanner for CountingScanner {
        fn scan(&self, config: &ScanConfig) -> Result<ResourceIndex> {
            let index = self.inner.scan(config)?;
            self.scans.fetch_add(1, Ordering::SeqCst);
            Ok(index)
        }
    }

    fn setup_test_scanner() -> MemoryScanner {
        let mut scanner = MemoryScanner::new();
        scanner.insert("/a/b.txt", b"0123456789".to_vec()).unwrap();
        scanner.insert("/a/c.txt", b"xyz".to_vec()).unwrap();
        scanner.insert("/d.txt", Vec::new()).unwrap();
        scanner
    }

    fn setup_test_store() -> FileStore {
        FileStore::new(Arc::new(setup_test_scanner()), ScanConfig::default())
    }

    fn setup_counting_store() -> (FileStore, Arc<CountingScanner>) {
        let scanner = Arc::new(CountingScanner {
            inner: setup_test_scanner(),
            scans: AtomicUsize::new(0),
        });
        let store = FileStore::new(scanner.clone(), ScanConfig::default());
        (store, scanner)
    }

    mod scanning {
        use super::*;

        #[test]
        fn test_scan_happens_once() {
            let (store, scanner) = setup_counting_store();
            assert!(!store.is_scanned());

            store.ensure_scanned().unwrap();
            store.ensure_scanned().unwrap();
            store.lookup_exact("/d.txt").unwrap();

            assert_eq!(scanner.scans.load(Ordering::SeqCst), 1);
            assert!(store.is_scanned());
        }

        #[test]
        fn test_reset_permits_rescan() {
            let (store, scanner) = setup_counting_store();
            store.ensure_scanned().unwrap();
            store.reset();
            store.reset(); // idempotent
            assert!(!store.is_scanned());

            store.ensure_scanned().unwrap();
            assert_eq!(scanner.scans.load(Ordering::SeqCst), 2);
        }

        #[test]
        fn test_scan_failure_aborts_and_retries() {
            let store = FileStore::new(
                Arc::new(setup_test_scanner()),
                ScanConfig {
                    threads: Some(0),
                    ..ScanConfig::default()
                },
            );
            assert!(matches!(store.ensure_scanned(), Err(FsError::Config(_))));
            assert!(!store.is_scanned());
        }

        #[test]
        fn test_identity_is_cached_with_index() {
            let store = setup_test_store();
            let first = store.identity().unwrap();
            let second = store.identity().unwrap();
            assert_eq!(first, second);
        }

        #[test]
        fn test_concurrent_first_scans_converge() {
            let (store, _) = setup_counting_store();
            let store = Arc::new(store);

            let identities: Vec<u64> = std::thread::scope(|scope| {
                let handles: Vec<_> = (0..8)
                    .map(|_| {
                        let store = Arc::clone(&store);
                        scope.spawn(move || store.ensure_scanned().unwrap().identity())
                    })
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect()
            });

            let expected = store.identity().unwrap();
            assert!(identities.iter().all(|&id| id == expected));
        }
    }

    mod lookup {
        use super::*;

        #[test]
        fn test_exact_hit_and_miss() {
            let store = setup_test_store();
            assert_eq!(store.lookup_exact("/a/b.txt").unwrap().len(), 1);
            assert!(store.lookup_exact("/missing").unwrap().is_empty());
        }

        #[test]
        fn test_prefix_is_raw_string_match() {
            let store = setup_test_store();
            let under_a: Vec<_> = store
                .lookup_prefix("/a/")
                .unwrap()
                .iter()
                .map(|r| r.path().to_string())
                .collect();
            assert_eq!(under_a, vec!["/a/b.txt", "/a/c.txt"]);

            assert_eq!(store.lookup_prefix("/").unwrap().len(), 3);
        }
    }

    mod channels {
        use super::*;

        #[test]
        fn test_open_missing_path_is_not_found() {
            let store = setup_test_store();
            assert!(matches!(
                store.open_channel("/missing"),
                Err(FsError::NotFound { .. })
            ));
        }

        #[test]
        fn test_duplicate_paths_first_in_scan_order_wins() {
            let mut scanner = MemoryScanner::new();
            scanner.insert("/dup", b"winner".to_vec()).unwrap();
            scanner.insert("/dup", b"shadowed".to_vec()).unwrap();
            let store = FileStore::new(Arc::new(scanner), ScanConfig::default());

            let mut channel = store.open_channel("/dup").unwrap();
            let mut buf = [0u8; 16];
            let n = channel.read(&mut buf).unwrap();
            assert_eq!(&buf[..n], b"winner");
        }

        #[test]
        fn test_strategy_choice_is_not_observable() {
            // thresholds straddling the 10-byte resource length
            for threshold in [9u64, 10, 11] {
                let store = FileStore::new(
                    Arc::new(setup_test_scanner()),
                    ScanConfig {
                        max_buffer_size: threshold,
                        ..ScanConfig::default()
                    },
                );
                let mut channel = store.open_channel("/a/b.txt").unwrap();
                let mut out = Vec::new();
                let mut buf = [0u8; 4];
                loop {
                    let n = channel.read(&mut buf).unwrap();
                    if n == 0 {
                        break;
                    }
                    out.extend_from_slice(&buf[..n]);
                }
                assert_eq!(out, b"0123456789", "threshold {threshold}");
            }
        }

        #[test]
        fn test_zero_length_resource_opens() {
            let store = setup_test_store();
            let mut channel = store.open_channel("/d.txt").unwrap();
            assert_eq!(channel.size(), 0);
            let mut buf = [0u8; 1];
            assert_eq!(channel.read(&mut buf).unwrap(), 0);
        }
    }
}
