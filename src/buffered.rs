//! Push-back decorator.
//!
//! [`Buffered`] interposes a small push-back slot between the derived read
//! operations and the inner stream's primitives, replacing method
//! interception with an explicit wrapper composed at construction time.
//! Pushed-back bytes are returned by the next primitive-level read before
//! the inner stream is consulted again.
//!
//! Push-back holds raw bytes. With a transcoding converter configured, a
//! re-read of pushed-back bytes goes through the converter again.

use crate::close::Closable;
use crate::error::Result;
use crate::read::{read_until_bytewise, ReadChunk, Readable};
use crate::seek::{Seekable, SeekFrom};
use crate::stream::{Stream, StreamCore};
use crate::text::Text;
use crate::write::{Writable, WriteChunk};
use smallvec::SmallVec;

/// Wraps any stream with unget support.
///
/// Forwards every capability of the inner stream; only the read primitives
/// change, to consult the push-back slot first. Seeking discards pending
/// push-back.
#[derive(Debug)]
pub struct Buffered<S> {
    inner: S,
    // LIFO: the most recently pushed byte is returned first.
    pushback: SmallVec<[u8; 8]>,
}

impl<S> Buffered<S> {
    /// Wraps a stream with an empty push-back slot.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            pushback: SmallVec::new(),
        }
    }

    /// Returns a reference to the inner stream.
    #[must_use]
    pub const fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Returns a mutable reference to the inner stream.
    ///
    /// Reading through it directly bypasses pending push-back.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Consumes the wrapper, returning the inner stream. Pending push-back
    /// is discarded.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Number of pushed-back bytes waiting to be re-read.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pushback.len()
    }

    /// Pushes one byte back; the next byte read returns it.
    pub fn unget_byte(&mut self, byte: u8) {
        self.pushback.push(byte);
    }

    /// Pushes a byte sequence back; the next reads return it in order.
    pub fn unget_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes.iter().rev() {
            self.pushback.push(b);
        }
    }

    /// Pushes a decoded character (or any text chunk) back as raw bytes.
    pub fn unget_text(&mut self, text: &Text) {
        self.unget_bytes(text.as_bytes());
    }

    fn drain_pushback(&mut self, max: Option<usize>) -> Vec<u8> {
        let take = max.map_or(self.pushback.len(), |m| m.min(self.pushback.len()));
        let mut out = Vec::with_capacity(take);
        while out.len() < take {
            match self.pushback.pop() {
                Some(b) => out.push(b),
                None => break,
            }
        }
        out
    }
}

impl<S: Stream> Stream for Buffered<S> {
    fn core(&self) -> &StreamCore {
        self.inner.core()
    }

    fn core_mut(&mut self) -> &mut StreamCore {
        self.inner.core_mut()
    }

    fn intrinsic_encoding(&self) -> crate::encoding::EncodingId {
        self.inner.intrinsic_encoding()
    }

    fn is_interactive(&self) -> bool {
        self.inner.is_interactive()
    }
}

impl<S: Closable> Closable for Buffered<S> {
    fn on_close_read(&mut self) -> Result<()> {
        self.inner.on_close_read()
    }

    fn on_close_write(&mut self) -> Result<()> {
        self.inner.on_close_write()
    }
}

impl<S: Readable> Readable for Buffered<S> {
    fn prim_eof(&mut self) -> Result<bool> {
        if self.pushback.is_empty() {
            self.inner.prim_eof()
        } else {
            Ok(false)
        }
    }

    fn prim_read_byte(&mut self) -> Result<Option<u8>> {
        match self.pushback.pop() {
            Some(b) => Ok(Some(b)),
            None => self.inner.prim_read_byte(),
        }
    }

    fn prim_read(&mut self, length: Option<usize>) -> Result<Option<Vec<u8>>> {
        if self.pushback.is_empty() {
            return self.inner.prim_read(length);
        }
        match length {
            Some(0) => Ok(Some(Vec::new())),
            Some(n) => {
                let mut buf = self.drain_pushback(Some(n));
                if buf.len() < n {
                    if let Some(rest) = self.inner.prim_read(Some(n - buf.len()))? {
                        buf.extend_from_slice(&rest);
                    }
                }
                Ok(Some(buf))
            }
            None => {
                let mut buf = self.drain_pushback(None);
                if let Some(rest) = self.inner.prim_read(None)? {
                    buf.extend_from_slice(&rest);
                }
                Ok(Some(buf))
            }
        }
    }

    fn prim_read_until(&mut self, delim: &[u8], limit: Option<usize>) -> Result<Option<Vec<u8>>> {
        if self.pushback.is_empty() {
            return self.inner.prim_read_until(delim, limit);
        }
        // The delimiter may span the push-back/inner boundary, so the
        // native bulk search cannot be trusted here.
        read_until_bytewise(self, delim, limit)
    }

    fn prim_read_nonblock(&mut self, maxlen: usize) -> Result<ReadChunk> {
        if self.pushback.is_empty() {
            self.inner.prim_read_nonblock(maxlen)
        } else {
            Ok(ReadChunk::Data(self.drain_pushback(Some(maxlen))))
        }
    }
}

impl<S: Writable> Writable for Buffered<S> {
    fn prim_write(&mut self, bytes: &[u8]) -> Result<usize> {
        self.inner.prim_write(bytes)
    }

    fn prim_write_nonblock(&mut self, bytes: &[u8]) -> Result<WriteChunk> {
        self.inner.prim_write_nonblock(bytes)
    }

    fn prim_flush(&mut self) -> Result<()> {
        self.inner.prim_flush()
    }
}

impl<S: Seekable> Seekable for Buffered<S> {
    fn prim_seek(&mut self, pos: SeekFrom) -> Result<u64> {
        // A seek invalidates anything the caller pushed back.
        self.pushback.clear();
        self.inner.prim_seek(pos)
    }
}
