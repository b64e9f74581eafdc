//! The Readable capability: four primitive read hooks and the derived
//! operation surface built on them.
//!
//! A minimal backend overrides only [`Readable::prim_read_byte`] (and
//! [`Readable::prim_eof`] for finite streams); the bulk and delimited
//! primitives have byte-at-a-time defaults, so every derived operation works
//! immediately. Backends with native bulk reads override the bulk hooks for
//! efficiency; the observable results must not change.
//!
//! Derived operations call only primitive hooks, never each other's
//! primitives, and the byte paths never touch the encoding converter.

use crate::close::Closable;
use crate::error::{Result, StreamError};
use crate::iter::{Bytes, Chars, Lines};
use crate::text::Text;

/// Default line separator, threaded explicitly through every line read.
pub const DEFAULT_SEPARATOR: &[u8] = b"\n";

/// Result of a non-blocking read: the three-way protocol.
///
/// `WouldBlock` ("no data now, not at end") and `End` ("no more data ever")
/// are distinct by design; collapsing them breaks non-blocking semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadChunk {
    /// Up to the requested number of immediately available bytes.
    Data(Vec<u8>),
    /// Nothing available without blocking, but the stream is not at end.
    WouldBlock,
    /// End of stream.
    End,
}

/// Separator/limit arguments for the line-reading operations.
///
/// Preserves the classic parameter overload: a bare integer in the separator
/// position means "limit, with the default separator".
///
/// ```
/// use primio::LineParams;
///
/// let _defaults: LineParams = ().into();
/// let _sep: LineParams = "\r\n".into();
/// let _limit: LineParams = 80.into();
/// let _both: LineParams = ("\r\n", 80).into();
/// ```
#[derive(Debug, Clone, Default)]
pub struct LineParams {
    separator: Option<Vec<u8>>,
    limit: Option<usize>,
}

impl LineParams {
    /// Defaults: newline separator, no limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            separator: None,
            limit: None,
        }
    }

    /// Replaces the separator.
    #[must_use]
    pub fn separator(mut self, sep: impl Into<Vec<u8>>) -> Self {
        self.separator = Some(sep.into());
        self
    }

    /// Replaces the byte limit.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resolves to concrete separator bytes and limit, validating the
    /// separator against the stream's effective external encoding.
    pub(crate) fn resolve(
        &self,
        external: crate::encoding::EncodingId,
    ) -> Result<(Vec<u8>, Option<usize>)> {
        let sep = self
            .separator
            .clone()
            .unwrap_or_else(|| DEFAULT_SEPARATOR.to_vec());
        if sep.is_empty() {
            return Err(StreamError::invalid_encoding("empty line separator"));
        }
        if !external.validates(&sep) {
            return Err(StreamError::invalid_encoding(format!(
                "separator is not valid in the stream's {external} encoding"
            )));
        }
        Ok((sep, self.limit))
    }
}

impl From<()> for LineParams {
    fn from((): ()) -> Self {
        Self::new()
    }
}

impl From<&str> for LineParams {
    fn from(sep: &str) -> Self {
        Self::new().separator(sep.as_bytes().to_vec())
    }
}

impl From<&[u8]> for LineParams {
    fn from(sep: &[u8]) -> Self {
        Self::new().separator(sep.to_vec())
    }
}

impl From<usize> for LineParams {
    fn from(limit: usize) -> Self {
        Self::new().limit(limit)
    }
}

impl From<(&str, usize)> for LineParams {
    fn from((sep, limit): (&str, usize)) -> Self {
        Self::new().separator(sep.as_bytes().to_vec()).limit(limit)
    }
}

impl From<(&[u8], usize)> for LineParams {
    fn from((sep, limit): (&[u8], usize)) -> Self {
        Self::new().separator(sep.to_vec()).limit(limit)
    }
}

/// Byte-at-a-time delimited read: accumulate until the buffer ends with
/// `delim`, `limit` bytes have been consumed, or the stream ends.
///
/// This is the contract the bulk hook must honor; it is also the fallback
/// when pushed-back bytes could make the delimiter span a buffer boundary.
pub(crate) fn read_until_bytewise<R: Readable + ?Sized>(
    stream: &mut R,
    delim: &[u8],
    limit: Option<usize>,
) -> Result<Option<Vec<u8>>> {
    let mut buf: Vec<u8> = Vec::new();
    loop {
        if !buf.is_empty() && buf.ends_with(delim) {
            break;
        }
        if let Some(limit) = limit {
            if buf.len() >= limit {
                break;
            }
        }
        match stream.prim_read_byte()? {
            Some(b) => buf.push(b),
            None => break,
        }
    }
    if buf.is_empty() && limit != Some(0) {
        Ok(None)
    } else {
        Ok(Some(buf))
    }
}

/// Readable capability.
///
/// The `prim_*` methods are the primitive hooks a backend supplies; the
/// rest is derived. Every derived operation first checks the read side of
/// the close state and fails with `ClosedStream` without touching any
/// primitive.
pub trait Readable: Closable {
    /// True iff no more bytes will ever be available.
    ///
    /// Default: always false, which is what an endless stream wants.
    /// Finite backends must override.
    fn prim_eof(&mut self) -> Result<bool> {
        Ok(false)
    }

    /// Reads one raw byte; `None` at end of stream.
    ///
    /// The one hook a minimal readable backend must implement.
    fn prim_read_byte(&mut self) -> Result<Option<u8>> {
        Err(StreamError::not_implemented("read_byte"))
    }

    /// Reads to end of stream, or exactly `length` bytes if given (fewer at
    /// end). `None` only when nothing at all could be read; a zero length
    /// yields an empty chunk.
    ///
    /// Default: repeated [`Readable::prim_read_byte`].
    fn prim_read(&mut self, length: Option<usize>) -> Result<Option<Vec<u8>>> {
        match length {
            Some(0) => Ok(Some(Vec::new())),
            Some(n) => {
                let mut buf = Vec::with_capacity(n.min(8192));
                while buf.len() < n {
                    match self.prim_read_byte()? {
                        Some(b) => buf.push(b),
                        None => break,
                    }
                }
                if buf.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(buf))
                }
            }
            None => {
                let mut buf = Vec::new();
                while let Some(b) = self.prim_read_byte()? {
                    buf.push(b);
                }
                if buf.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(buf))
                }
            }
        }
    }

    /// Reads raw bytes until `delim` appears as a suffix of the accumulated
    /// buffer, `limit` bytes have been consumed, or end of stream. The
    /// returned chunk includes the delimiter when it was found. `None` only
    /// when zero bytes were read and the end was reached; a zero limit
    /// yields an empty chunk.
    ///
    /// Default: repeated [`Readable::prim_read_byte`].
    fn prim_read_until(&mut self, delim: &[u8], limit: Option<usize>) -> Result<Option<Vec<u8>>> {
        read_until_bytewise(self, delim, limit)
    }

    /// Reads up to `maxlen` immediately available bytes without blocking.
    ///
    /// Returns [`ReadChunk::WouldBlock`] when nothing is available but the
    /// stream is not at end, and [`ReadChunk::End`] at end. Any timeout
    /// policy belongs here, expressed by returning `WouldBlock`.
    fn prim_read_nonblock(&mut self, maxlen: usize) -> Result<ReadChunk> {
        let _ = maxlen;
        Err(StreamError::not_implemented("read_nonblock"))
    }

    /// True iff the stream is at its end.
    fn eof(&mut self) -> Result<bool> {
        self.core().closed.check_read_open()?;
        self.prim_eof()
    }

    /// Reads one byte; `Ok(None)` at end of stream.
    fn get_byte(&mut self) -> Result<Option<u8>> {
        self.core().closed.check_read_open()?;
        self.prim_read_byte()
    }

    /// Reads one byte; `EndOfStream` at end.
    fn read_byte(&mut self) -> Result<u8> {
        self.get_byte()?.ok_or(StreamError::EndOfStream)
    }

    /// Reads one character; `Ok(None)` at end of stream.
    ///
    /// Bytes are accumulated until they form a complete character under the
    /// effective external encoding, then run through the converter, so a
    /// multi-byte sequence is one character regardless of whether an
    /// internal encoding is configured. Under `Binary` every byte is a
    /// character.
    fn get_char(&mut self) -> Result<Option<Text>> {
        self.core().closed.check_read_open()?;
        let external = self.external_encoding();
        let mut buf: Vec<u8> = Vec::new();
        loop {
            let Some(b) = self.prim_read_byte()? else {
                // Truncated trailing sequence: surface what remains.
                if buf.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(self.convert_bytes(&buf)?));
            };
            buf.push(b);
            // No supported encoding uses sequences longer than four bytes,
            // so a longer buffer can never become valid.
            if external.validates(&buf) || buf.len() >= 4 {
                let text = self.convert_bytes(&buf)?;
                if !text.is_empty() {
                    return Ok(Some(text));
                }
                buf.clear();
            }
        }
    }

    /// Decodes one character; `EndOfStream` at end.
    fn read_char(&mut self) -> Result<Text> {
        self.get_char()?.ok_or(StreamError::EndOfStream)
    }

    /// Reads one line; `Ok(None)` at end of stream.
    ///
    /// The returned text includes the separator when it was found, decoded
    /// through the converter. Increments the line counter on success.
    fn gets<P: Into<LineParams>>(&mut self, params: P) -> Result<Option<Text>> {
        self.core().closed.check_read_open()?;
        let (sep, limit) = params.into().resolve(self.external_encoding())?;
        let Some(raw) = self.prim_read_until(&sep, limit)? else {
            return Ok(None);
        };
        let text = self.convert_bytes(&raw)?;
        self.core_mut().line_number += 1;
        Ok(Some(text))
    }

    /// Reads one line; `EndOfStream` at end.
    fn read_line<P: Into<LineParams>>(&mut self, params: P) -> Result<Text> {
        self.gets(params)?.ok_or(StreamError::EndOfStream)
    }

    /// Reads all remaining lines.
    fn read_lines<P: Into<LineParams>>(&mut self, params: P) -> Result<Vec<Text>> {
        let params = params.into();
        let mut out = Vec::new();
        while let Some(line) = self.gets(params.clone())? {
            out.push(line);
        }
        Ok(out)
    }

    /// Raw byte read: to end of stream, or `length` bytes. `Ok(None)` when
    /// nothing at all was available.
    fn read(&mut self, length: Option<usize>) -> Result<Option<Vec<u8>>> {
        self.core().closed.check_read_open()?;
        self.prim_read(length)
    }

    /// Raw byte read into an existing buffer, replacing its contents in
    /// place and keeping the buffer's own encoding tag. Returns false (with
    /// the buffer untouched) when nothing was available.
    fn read_into(&mut self, length: Option<usize>, out: &mut Text) -> Result<bool> {
        self.core().closed.check_read_open()?;
        match self.prim_read(length)? {
            Some(bytes) => {
                out.replace_bytes(bytes);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Reads at least one and at most `maxlen` bytes, blocking only when
    /// nothing is immediately available.
    ///
    /// `maxlen == 0` returns empty without consulting the stream. Otherwise
    /// the three-way non-blocking protocol applies: data is returned as-is,
    /// end of stream fails with `EndOfStream`, and would-block falls back
    /// to a blocking bulk read. The would-block sentinel never escapes.
    fn read_partial(&mut self, maxlen: usize) -> Result<Vec<u8>> {
        self.core().closed.check_read_open()?;
        if maxlen == 0 {
            return Ok(Vec::new());
        }
        match self.prim_read_nonblock(maxlen)? {
            ReadChunk::Data(data) => Ok(data),
            ReadChunk::End => Err(StreamError::EndOfStream),
            ReadChunk::WouldBlock => {
                tracing::trace!(maxlen, "read_partial would block, using blocking read");
                self.prim_read(Some(maxlen))?.ok_or(StreamError::EndOfStream)
            }
        }
    }

    /// Non-blocking read exposing the three-way sentinel to the caller.
    ///
    /// Retrying a `WouldBlock` result is the caller's choice.
    fn read_nonblock(&mut self, maxlen: usize) -> Result<ReadChunk> {
        self.core().closed.check_read_open()?;
        self.prim_read_nonblock(maxlen)
    }

    /// Lazy iterator over raw byte values.
    fn bytes(&mut self) -> Bytes<'_, Self>
    where
        Self: Sized,
    {
        Bytes::new(self)
    }

    /// Lazy iterator over decoded characters.
    fn chars(&mut self) -> Chars<'_, Self>
    where
        Self: Sized,
    {
        Chars::new(self)
    }

    /// Lazy iterator over decoded lines.
    fn lines<P: Into<LineParams>>(&mut self, params: P) -> Lines<'_, Self>
    where
        Self: Sized,
    {
        Lines::new(self, params.into())
    }
}
