//! An in-process scanner over preloaded byte entries.

use std::sync::Arc;

use tracing::debug;

use crate::core::{FsError, Result};
use crate::scan::{ResourceIndex, ResourceRecord, ResourceScanner, ScanConfig};

/// A scanner whose resources live entirely in memory.
///
/// Entries keep their insertion order, which becomes the scan order of the
/// produced index. Useful as a test double and for serving generated or
/// embedded content through the filesystem API.
#[derive(Default)]
pub struct MemoryScanner {
    entries: Vec<(String, Arc<[u8]>)>,
}

impl MemoryScanner {
    pub fn new() -> MemoryScanner {
        MemoryScanner::default()
    }

    /// Adds one entry. `path` must be absolute; duplicates are allowed and
    /// retain insertion order.
    pub fn insert(&mut self, path: &str, bytes: impl Into<Arc<[u8]>>) -> Result<()> {
        if !path.starts_with('/') || path == "/" {
            return Err(FsError::invalid_path(format!(
                "resource path must be absolute and non-root: {path}"
            )));
        }
        self.entries.push((path.to_string(), bytes.into()));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceScanner for MemoryScanner {
    fn scan(&self, config: &ScanConfig) -> Result<ResourceIndex> {
        config.validate()?;
        let records: Vec<ResourceRecord> = self
            .entries
            .iter()
            .filter(|(path, _)| config.accepts(path))
            .map(|(path, bytes)| ResourceRecord::from_bytes(path.clone(), bytes.clone()))
            .collect();
        debug!(total = self.entries.len(), kept = records.len(), "memory scan complete");
        Ok(ResourceIndex::new(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_scanner() -> MemoryScanner {
        let mut scanner = MemoryScanner::new();
        scanner.insert("/a/b.txt", b"0123456789".to_vec()).unwrap();
        scanner.insert("/a/c.txt", b"xyz".to_vec()).unwrap();
        scanner.insert("/d.bin", b"\x00\x01".to_vec()).unwrap();
        scanner
    }

    mod insert {
        use super::*;

        #[test]
        fn test_relative_path_rejected() {
            let mut scanner = MemoryScanner::new();
            assert!(scanner.insert("relative.txt", b"x".to_vec()).is_err());
        }

        #[test]
        fn test_root_path_rejected() {
            let mut scanner = MemoryScanner::new();
            assert!(scanner.insert("/", b"x".to_vec()).is_err());
        }

        #[test]
        fn test_duplicates_allowed() {
            let mut scanner = MemoryScanner::new();
            scanner.insert("/dup", b"one".to_vec()).unwrap();
            scanner.insert("/dup", b"two".to_vec()).unwrap();
            assert_eq!(scanner.len(), 2);
        }
    }

    mod scan {
        use super::*;
        use std::sync::Arc;

        #[test]
        fn test_scan_keeps_insertion_order() {
            let scanner = setup_test_scanner();
            let index = scanner.scan(&ScanConfig::default()).unwrap();
            let paths: Vec<_> = index.all_resources().iter().map(|r| r.path()).collect();
            assert_eq!(paths, vec!["/a/b.txt", "/a/c.txt", "/d.bin"]);
        }

        #[test]
        fn test_scan_applies_reject_prefixes() {
            let scanner = setup_test_scanner();
            let config = ScanConfig {
                reject_paths: vec!["/a".to_string()],
                ..ScanConfig::default()
            };
            let index = scanner.scan(&config).unwrap();
            assert_eq!(index.len(), 1);
            assert_eq!(index.all_resources()[0].path(), "/d.bin");
        }

        #[test]
        fn test_scan_applies_filter_predicate() {
            let scanner = setup_test_scanner();
            let config = ScanConfig {
                filter: Some(Arc::new(|p: &str| p.ends_with(".txt"))),
                ..ScanConfig::default()
            };
            let index = scanner.scan(&config).unwrap();
            assert_eq!(index.len(), 2);
        }

        #[test]
        fn test_scan_propagates_config_error() {
            let scanner = setup_test_scanner();
            let config = ScanConfig {
                threads: Some(0),
                ..ScanConfig::default()
            };
            assert!(matches!(scanner.scan(&config), Err(FsError::Config(_))));
        }

        #[test]
        fn test_rescan_identity_is_stable() {
            let scanner = setup_test_scanner();
            let a = scanner.scan(&ScanConfig::default()).unwrap();
            let b = scanner.scan(&ScanConfig::default()).unwrap();
            assert_eq!(a.identity(), b.identity());
        }
    }
}
