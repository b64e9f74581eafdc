//! Random access capability.
//!
//! Backends with a native seek supply [`Seekable::prim_seek`]; everything
//! else (`tell`, `set_position`, `rewind`) is derived. `rewind` also resets
//! the line counter — seeking back to the start restarts line numbering.

use crate::error::{Result, StreamError};
use crate::stream::Stream;

pub use std::io::SeekFrom;

/// Random access capability.
pub trait Seekable: Stream {
    /// Moves the read/write position, returning the new absolute offset.
    fn prim_seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let _ = pos;
        Err(StreamError::not_implemented("seek"))
    }

    /// Seeks to `pos`, returning the new absolute offset. Fails with
    /// `ClosedStream` once both sides are closed.
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        if self.core().closed.is_closed() {
            return Err(StreamError::ClosedStream);
        }
        self.prim_seek(pos)
    }

    /// The current absolute position.
    fn tell(&mut self) -> Result<u64> {
        self.seek(SeekFrom::Current(0))
    }

    /// Seeks to an absolute position.
    fn set_position(&mut self, pos: u64) -> Result<u64> {
        self.seek(SeekFrom::Start(pos))
    }

    /// Seeks back to the start and resets the line counter to zero.
    fn rewind(&mut self) -> Result<()> {
        self.seek(SeekFrom::Start(0))?;
        self.core_mut().line_number = 0;
        Ok(())
    }
}
