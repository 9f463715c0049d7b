use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FsError>;

/// Error taxonomy for the resource filesystem.
///
/// Path-algebra errors (`InvalidPath`, `InvalidSeek`) are usage errors and
/// always recoverable by the caller. Scan failures (`Config`) abort the whole
/// scan; a later call may retry with a corrected configuration. Channel I/O
/// failures (`Io`) are never retried internally: resource content is assumed
/// static, so a retry would not change the outcome of a truncated stream.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("invalid path: {reason}")]
    InvalidPath { reason: String },

    #[error("no resource found matching {path}")]
    NotFound { path: String },

    #[error("position {position} out of range for resource of {size} bytes")]
    InvalidSeek { position: u64, size: u64 },

    #[error("{op} is not supported by a read-only filesystem")]
    Unsupported { op: &'static str },

    #[error("channel is closed")]
    Closed,

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid scanner configuration")]
    Config(#[source] anyhow::Error),
}

impl FsError {
    pub(crate) fn invalid_path(reason: impl Into<String>) -> Self {
        FsError::InvalidPath {
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        FsError::NotFound { path: path.into() }
    }

    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        FsError::Io {
            context: context.into(),
            source,
        }
    }

    /// The underlying stream ended before the expected byte count was served.
    pub(crate) fn truncated(path: &str, expected: u64, got: u64) -> Self {
        FsError::Io {
            context: format!("{path}: ran out of bytes at {got} of {expected}"),
            source: io::Error::new(io::ErrorKind::UnexpectedEof, "stream ended early"),
        }
    }
}

impl From<FsError> for io::Error {
    fn from(err: FsError) -> Self {
        let kind = match &err {
            FsError::NotFound { .. } => io::ErrorKind::NotFound,
            FsError::InvalidPath { .. } | FsError::InvalidSeek { .. } => {
                io::ErrorKind::InvalidInput
            }
            FsError::Unsupported { .. } => io::ErrorKind::Unsupported,
            FsError::Closed => io::ErrorKind::NotConnected,
            FsError::Io { source, .. } => source.kind(),
            FsError::Config(_) => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, err)
    }
}
