use crate::core::Result;
use crate::scan::{ResourceIndex, ScanConfig};

/// The external collaborator that discovers resources.
///
/// A scan is a single execution producing a [`ResourceIndex`]; the index is
/// immutable once returned. Implementations interpret everything in
/// [`ScanConfig`] except `max_buffer_size`, which belongs to the filesystem.
pub trait ResourceScanner: Send + Sync {
    fn scan(&self, config: &ScanConfig) -> Result<ResourceIndex>;
}
