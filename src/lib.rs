//! A read-only, hierarchical filesystem view over a flat collection of named
//! binary resources (e.g. entries aggregated from several archives or
//! directories on a search path).
//!
//! ### Overview
//!
//! `resfs-kit` lets clients navigate a scanned resource namespace with ordinary
//! path operations and read resource bytes through a seekable cursor, without
//! knowing which underlying container each resource came from.
//!
//! **Key ideas**:
//! - **Virtual paths**: absolute, slash-delimited path values with their own
//!   normalize/resolve/relativize algebra; never tied to an on-disk location.
//! - **Lazy index**: a `FileStore` materializes the resource index on first
//!   use by invoking a `ResourceScanner`, and caches it until reset.
//! - **Seekable reads**: small resources are buffered in memory, large ones
//!   are served by a streaming cursor that reopens and skips; the choice is
//!   never observable in the bytes produced.
//! - **Read-only**: writes, deletes, renames and watches always fail.
//! - **Extensibility**: plug in your own scanner to serve any container kind.

mod core;
mod scan;
mod vfs;

pub use crate::core::{FsError, Result};
pub use crate::scan::{
    DirScanner, MemoryScanner, ResourceFilter, ResourceIndex, ResourceRecord, ResourceScanner,
    ScanConfig,
};
pub use crate::vfs::{
    BufferedChannel, FileStore, RandomAccess, ReadDir, ResourceFs, SEPARATOR, StoreId,
    StreamingChannel, VirtualPath,
};
