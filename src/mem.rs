//! In-memory reference backend.
//!
//! [`MemoryStream`] is a cursor over a byte vector implementing every
//! capability with native bulk primitives. It is the crate's concrete
//! backend for tests and small tools, and the conformance baseline the
//! byte-at-a-time defaults are compared against.
//!
//! Memory never blocks, so the non-blocking read primitive only ever
//! reports data or end, and non-blocking writes always accept.

use crate::close::Closable;
use crate::error::{Result, StreamError};
use crate::read::{ReadChunk, Readable};
use crate::seek::{Seekable, SeekFrom};
use crate::stream::{Stream, StreamCore};
use crate::write::{Writable, WriteChunk};

/// Growable in-memory stream with one read/write position.
#[derive(Debug, Default)]
pub struct MemoryStream {
    core: StreamCore,
    data: Vec<u8>,
    pos: usize,
}

impl MemoryStream {
    /// Empty stream, position zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream positioned at the start of a copy of `data`.
    #[must_use]
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::from_vec(data.to_vec())
    }

    /// Stream positioned at the start of `data`, taking ownership.
    #[must_use]
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self {
            core: StreamCore::new(),
            data,
            pos: 0,
        }
    }

    /// The full underlying contents, regardless of position.
    #[must_use]
    pub fn contents(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the stream, returning the underlying contents.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Current absolute position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    fn remaining(&self) -> &[u8] {
        &self.data[self.pos.min(self.data.len())..]
    }
}

/// End index (inclusive of the delimiter) of the first `delim` occurrence
/// that fits inside the first `window` bytes of `hay`.
fn delimiter_end(hay: &[u8], delim: &[u8], window: usize) -> Option<usize> {
    if delim.is_empty() || delim.len() > window {
        return None;
    }
    hay[..window]
        .windows(delim.len())
        .position(|w| w == delim)
        .map(|i| i + delim.len())
}

impl Stream for MemoryStream {
    fn core(&self) -> &StreamCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StreamCore {
        &mut self.core
    }
}

impl Closable for MemoryStream {}

impl Readable for MemoryStream {
    fn prim_eof(&mut self) -> Result<bool> {
        Ok(self.pos >= self.data.len())
    }

    fn prim_read_byte(&mut self) -> Result<Option<u8>> {
        let b = self.data.get(self.pos).copied();
        if b.is_some() {
            self.pos += 1;
        }
        Ok(b)
    }

    fn prim_read(&mut self, length: Option<usize>) -> Result<Option<Vec<u8>>> {
        if length == Some(0) {
            return Ok(Some(Vec::new()));
        }
        let remaining = self.remaining();
        if remaining.is_empty() {
            return Ok(None);
        }
        let take = length.map_or(remaining.len(), |n| n.min(remaining.len()));
        let chunk = remaining[..take].to_vec();
        self.pos += take;
        Ok(Some(chunk))
    }

    fn prim_read_until(&mut self, delim: &[u8], limit: Option<usize>) -> Result<Option<Vec<u8>>> {
        let remaining = self.remaining();
        if remaining.is_empty() {
            return Ok(if limit == Some(0) {
                Some(Vec::new())
            } else {
                None
            });
        }
        let window = limit.map_or(remaining.len(), |l| l.min(remaining.len()));
        let take = delimiter_end(remaining, delim, window).unwrap_or(window);
        let chunk = remaining[..take].to_vec();
        self.pos += take;
        Ok(Some(chunk))
    }

    fn prim_read_nonblock(&mut self, maxlen: usize) -> Result<ReadChunk> {
        // Memory is always immediately available: data or end, never block.
        match self.prim_read(Some(maxlen))? {
            Some(chunk) => Ok(ReadChunk::Data(chunk)),
            None => Ok(ReadChunk::End),
        }
    }
}

impl Writable for MemoryStream {
    fn prim_write(&mut self, bytes: &[u8]) -> Result<usize> {
        if self.pos > self.data.len() {
            // Position was seeked past the end; pad the gap.
            self.data.resize(self.pos, 0);
        }
        let overlap = (self.data.len() - self.pos).min(bytes.len());
        self.data[self.pos..self.pos + overlap].copy_from_slice(&bytes[..overlap]);
        self.data.extend_from_slice(&bytes[overlap..]);
        self.pos += bytes.len();
        Ok(bytes.len())
    }

    fn prim_write_nonblock(&mut self, bytes: &[u8]) -> Result<WriteChunk> {
        Ok(WriteChunk::Wrote(self.prim_write(bytes)?))
    }
}

impl Seekable for MemoryStream {
    fn prim_seek(&mut self, pos: SeekFrom) -> Result<u64> {
        #[allow(clippy::cast_possible_wrap)]
        let target = match pos {
            SeekFrom::Start(n) => n as i64,
            SeekFrom::Current(delta) => self.pos as i64 + delta,
            SeekFrom::End(delta) => self.data.len() as i64 + delta,
        };
        if target < 0 {
            return Err(StreamError::InvalidSeek { position: target });
        }
        #[allow(clippy::cast_sign_loss)]
        {
            self.pos = target as usize;
            Ok(target as u64)
        }
    }
}
