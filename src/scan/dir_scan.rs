//! A scanner that walks a host directory tree.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use tracing::debug;

use crate::core::{FsError, Result};
use crate::scan::{ResourceIndex, ResourceRecord, ResourceScanner, ScanConfig};

/// A scanner rooted at a host directory.
///
/// Each regular file below the root becomes one resource whose virtual path
/// is the `/`-joined path relative to the root. Records open the host file
/// afresh on every `open()`, so streams are independent. Entries are sorted
/// by virtual path so the scan order (and the index identity derived from
/// it) does not depend on the host's directory iteration order.
///
/// Symbolic links are not followed.
pub struct DirScanner {
    root: PathBuf,
}

impl DirScanner {
    /// `root` must name an existing directory on the host.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<DirScanner> {
        let root = root.as_ref();
        if root.as_os_str().is_empty() {
            return Err(FsError::Config(anyhow!("invalid root path: empty")));
        }
        if !root.is_dir() {
            return Err(FsError::Config(anyhow!("{root:?} is not a directory")));
        }
        let root = root
            .canonicalize()
            .map_err(|e| FsError::io(format!("canonicalizing {}", root.display()), e))?;
        Ok(DirScanner { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn walk(&self, config: &ScanConfig) -> Result<Vec<(String, PathBuf, u64)>> {
        let mut found = Vec::new();
        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let entries = fs::read_dir(&dir)
                .map_err(|e| FsError::io(format!("reading {}", dir.display()), e))?;
            for entry in entries {
                let entry =
                    entry.map_err(|e| FsError::io(format!("reading {}", dir.display()), e))?;
                let host = entry.path();
                let meta = entry
                    .metadata()
                    .map_err(|e| FsError::io(format!("stat {}", host.display()), e))?;
                if meta.is_dir() {
                    pending.push(host);
                } else if meta.is_file() {
                    let inner = self.to_inner(&host)?;
                    if config.accepts(&inner) {
                        found.push((inner, host, meta.len()));
                    }
                }
            }
        }
        found.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(found)
    }

    /// Maps a host path below the root to its virtual `/`-joined form.
    fn to_inner(&self, host: &Path) -> Result<String> {
        let rel = host.strip_prefix(&self.root).map_err(|_| {
            FsError::invalid_path(format!("{} escapes scan root", host.display()))
        })?;
        let mut inner = String::new();
        for component in rel.components() {
            inner.push('/');
            inner.push_str(&component.as_os_str().to_string_lossy());
        }
        Ok(inner)
    }
}

impl ResourceScanner for DirScanner {
    fn scan(&self, config: &ScanConfig) -> Result<ResourceIndex> {
        config.validate()?;
        if !config.scan_dirs {
            debug!(root = %self.root.display(), "directory scanning disabled");
            return Ok(ResourceIndex::new(Vec::new()));
        }
        let found = self.walk(config)?;
        debug!(root = %self.root.display(), resources = found.len(), "directory scan complete");
        let records = found
            .into_iter()
            .map(|(inner, host, len)| {
                ResourceRecord::new(inner, len, move || {
                    fs::File::open(&host).map(|f| Box::new(f) as Box<dyn Read + Send>)
                })
            })
            .collect();
        Ok(ResourceIndex::new(records))
    }
}
