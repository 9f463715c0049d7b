//! Scanner configuration.

use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;

use crate::core::{FsError, Result};

/// Predicate applied to each candidate resource path during a scan.
pub type ResourceFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Configuration for one scan.
///
/// All fields are independently defaulted. The core filesystem inspects only
/// `max_buffer_size` (to pick a read strategy); every other field is
/// interpreted by the [`ResourceScanner`](crate::ResourceScanner)
/// implementation and passed through opaquely.
#[derive(Clone)]
pub struct ScanConfig {
    /// Resource-length cutoff (in bytes) at or below which an opened channel
    /// buffers the whole resource in memory instead of streaming. Also bounds
    /// the chunk size used by the streaming cursor while skipping.
    pub max_buffer_size: u64,
    /// Absolute path prefixes to include. Empty means "accept everything".
    pub accept_paths: Vec<String>,
    /// Absolute path prefixes to exclude. Rejection wins over acceptance.
    pub reject_paths: Vec<String>,
    /// Whether the scanner should descend into archive containers.
    pub scan_archives: bool,
    /// Whether the scanner should walk plain directories.
    pub scan_dirs: bool,
    /// Scanner worker thread count; `None` leaves it to the scanner.
    pub threads: Option<usize>,
    /// Optional per-path predicate; a resource is kept only if it returns true.
    pub filter: Option<ResourceFilter>,
}

impl Default for ScanConfig {
    fn default() -> ScanConfig {
        ScanConfig {
            max_buffer_size: 64 * 1024,
            accept_paths: Vec::new(),
            reject_paths: Vec::new(),
            scan_archives: true,
            scan_dirs: true,
            threads: None,
            filter: None,
        }
    }
}

impl fmt::Debug for ScanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanConfig")
            .field("max_buffer_size", &self.max_buffer_size)
            .field("accept_paths", &self.accept_paths)
            .field("reject_paths", &self.reject_paths)
            .field("scan_archives", &self.scan_archives)
            .field("scan_dirs", &self.scan_dirs)
            .field("threads", &self.threads)
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl ScanConfig {
    /// Checks structural validity. Called once, at scan time.
    pub fn validate(&self) -> Result<()> {
        if self.threads == Some(0) {
            return Err(FsError::Config(anyhow!("threads must be non-zero")));
        }
        for prefix in self.accept_paths.iter().chain(&self.reject_paths) {
            if !prefix.starts_with('/') {
                return Err(FsError::Config(anyhow!(
                    "path prefix must be absolute: {prefix}"
                )));
            }
        }
        for prefix in &self.accept_paths {
            if self.reject_paths.contains(prefix) {
                return Err(FsError::Config(anyhow!(
                    "prefix both accepted and rejected: {prefix}"
                )));
            }
        }
        Ok(())
    }

    /// Applies the accept/reject prefixes and the filter predicate to one
    /// candidate path. Shared by the bundled scanners.
    pub fn accepts(&self, path: &str) -> bool {
        if self.reject_paths.iter().any(|p| path.starts_with(p.as_str())) {
            return false;
        }
        if !self.accept_paths.is_empty()
            && !self.accept_paths.iter().any(|p| path.starts_with(p.as_str()))
        {
            return false;
        }
        match &self.filter {
            Some(filter) => filter(path),
            None => true,
        }
    }

    /// Chunk size for the streaming read strategy, derived from
    /// `max_buffer_size` and never zero.
    pub(crate) fn chunk_size(&self) -> usize {
        self.max_buffer_size.clamp(1, usize::MAX as u64) as usize
    }
}
