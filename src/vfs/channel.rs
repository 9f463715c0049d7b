//! Seekable, read-only cursors over one resource's bytes.
//!
//! Two interchangeable strategies exist: [`BufferedChannel`] materializes the
//! whole resource up front, [`StreamingChannel`] keeps a live stream and
//! seeks by discarding or reopening. Which one a [`FileStore`] hands out is a
//! performance detail; the bytes produced are identical.
//!
//! [`FileStore`]: crate::FileStore

use std::io::{self, Read, Seek, SeekFrom};

use tracing::trace;

use crate::core::{FsError, Result};
use crate::scan::ResourceRecord;

/// A read-only cursor bound to one resource.
///
/// Not safe for concurrent use; each caller must obtain its own view.
/// `write` and `truncate` always fail: the filesystem is permanently
/// read-only. `close` is idempotent.
pub trait RandomAccess {
    /// Fixed at construction from the resource record.
    fn size(&self) -> u64;

    fn position(&self) -> u64;

    /// Seeks to an absolute offset. Fails with `InvalidSeek` when
    /// `pos > size()`; `pos == size()` is valid and subsequent reads return
    /// `Ok(0)`.
    fn set_position(&mut self, pos: u64) -> Result<()>;

    /// Copies bytes at the current position into `buf`, advancing the
    /// position. `Ok(0)` means end-of-resource.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    fn write(&mut self, _buf: &[u8]) -> Result<usize> {
        Err(FsError::Unsupported { op: "write" })
    }

    fn truncate(&mut self, _size: u64) -> Result<()> {
        Err(FsError::Unsupported { op: "truncate" })
    }

    fn is_open(&self) -> bool;

    fn close(&mut self);
}

/// Buffered strategy: the whole resource is read into memory at
/// construction; all position and read operations work on the buffer.
///
/// Chosen for resources no larger than the configured buffering threshold.
pub struct BufferedChannel {
    data: Vec<u8>,
    position: u64,
    open: bool,
}

impl BufferedChannel {
    /// Reads exactly `record.len()` bytes from a fresh stream. Fails with an
    /// I/O error when the stream ends before that.
    pub fn new(record: &ResourceRecord) -> Result<BufferedChannel> {
        let stream = record
            .open()
            .map_err(|e| FsError::io(format!("opening {}", record.path()), e))?;
        let mut data = Vec::with_capacity(record.len() as usize);
        let got = stream
            .take(record.len())
            .read_to_end(&mut data)
            .map_err(|e| FsError::io(format!("buffering {}", record.path()), e))?;
        if (got as u64) < record.len() {
            return Err(FsError::truncated(record.path(), record.len(), got as u64));
        }
        Ok(BufferedChannel {
            data,
            position: 0,
            open: true,
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open { Ok(()) } else { Err(FsError::Closed) }
    }
}

impl RandomAccess for BufferedChannel {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn set_position(&mut self, pos: u64) -> Result<()> {
        self.ensure_open()?;
        if pos > self.size() {
            return Err(FsError::InvalidSeek {
                position: pos,
                size: self.size(),
            });
        }
        self.position = pos;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.ensure_open()?;
        let remaining = self.data.len() - self.position as usize;
        if remaining == 0 {
            return Ok(0);
        }
        let wanted = buf.len().min(remaining);
        let start = self.position as usize;
        buf[..wanted].copy_from_slice(&self.data[start..start + wanted]);
        self.position += wanted as u64;
        Ok(wanted)
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        self.open = false;
    }
}

/// Streaming-reopen strategy: holds a live stream from the record's opener.
///
/// Forward seeks discard the intervening bytes in chunks of at most
/// `chunk_size`, bounding peak memory; backward seeks (and seeks to zero)
/// close and reopen the stream, then discard forward to the target. The
/// whole resource is never materialized — that is why this strategy exists
/// for large resources. Backward seeks therefore cost time linear in the
/// target offset, not O(1).
pub struct StreamingChannel {
    record: ResourceRecord,
    stream: Option<Box<dyn Read + Send>>,
    /// Logical cursor as seen by the caller.
    position: u64,
    /// Bytes consumed so far from the live stream.
    current: u64,
    chunk_size: usize,
    open: bool,
}

impl StreamingChannel {
    pub fn new(record: ResourceRecord, chunk_size: usize) -> Result<StreamingChannel> {
        let stream = record
            .open()
            .map_err(|e| FsError::io(format!("opening {}", record.path()), e))?;
        Ok(StreamingChannel {
            record,
            stream: Some(stream),
            position: 0,
            current: 0,
            chunk_size: chunk_size.max(1),
            open: true,
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open { Ok(()) } else { Err(FsError::Closed) }
    }

    fn reopen(&mut self) -> Result<()> {
        trace!(path = self.record.path(), "reopening stream for backward seek");
        self.stream = None;
        let stream = self
            .record
            .open()
            .map_err(|e| FsError::io(format!("reopening {}", self.record.path()), e))?;
        self.stream = Some(stream);
        self.current = 0;
        Ok(())
    }

    /// Reads and drops `count` bytes from the live stream in
    /// `chunk_size`-bounded slices.
    fn skip_forward(&mut self, count: u64) -> Result<()> {
        let mut remaining = count;
        let mut chunk = vec![0u8; self.chunk_size];
        let stream = self.stream.as_mut().ok_or(FsError::Closed)?;
        while remaining > 0 {
            let wanted = remaining.min(self.chunk_size as u64) as usize;
            let got = stream
                .read(&mut chunk[..wanted])
                .map_err(|e| FsError::io(format!("skipping in {}", self.record.path()), e))?;
            if got == 0 {
                return Err(FsError::truncated(
                    self.record.path(),
                    self.current + count,
                    self.current,
                ));
            }
            self.current += got as u64;
            remaining -= got as u64;
        }
        Ok(())
    }

    fn advance_to(&mut self, target: u64) -> Result<()> {
        if target < self.current {
            self.reopen()?;
        }
        self.skip_forward(target - self.current)
    }
}

impl RandomAccess for StreamingChannel {
    fn size(&self) -> u64 {
        self.record.len()
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn set_position(&mut self, pos: u64) -> Result<()> {
        self.ensure_open()?;
        if pos > self.size() {
            return Err(FsError::InvalidSeek {
                position: pos,
                size: self.size(),
            });
        }
        self.position = pos;
        self.advance_to(pos)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.ensure_open()?;
        let remaining = self.size() - self.position;
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let wanted = (buf.len() as u64).min(remaining) as usize;
        let stream = self.stream.as_mut().ok_or(FsError::Closed)?;
        let got = stream
            .read(&mut buf[..wanted])
            .map_err(|e| FsError::io(format!("reading {}", self.record.path()), e))?;
        if got == 0 {
            // The record promised more bytes than the stream can serve.
            return Err(FsError::truncated(
                self.record.path(),
                self.size(),
                self.position,
            ));
        }
        self.position += got as u64;
        self.current += got as u64;
        Ok(got)
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        self.stream = None;
        self.open = false;
    }
}

fn seek_impl<C: RandomAccess>(channel: &mut C, pos: SeekFrom) -> io::Result<u64> {
    let target = match pos {
        SeekFrom::Start(offset) => offset as i128,
        SeekFrom::Current(delta) => channel.position() as i128 + delta as i128,
        SeekFrom::End(delta) => channel.size() as i128 + delta as i128,
    };
    if target < 0 || target > channel.size() as i128 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("seek target {target} out of range"),
        ));
    }
    channel.set_position(target as u64)?;
    Ok(channel.position())
}

impl Read for BufferedChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        RandomAccess::read(self, buf).map_err(io::Error::from)
    }
}

impl Seek for BufferedChannel {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        seek_impl(self, pos)
    }
}

impl Read for StreamingChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        RandomAccess::read(self, buf).map_err(io::Error::from)
    }
}

impl Seek for StreamingChannel {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        seek_impl(self, pos)
    }
}
