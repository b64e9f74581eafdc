//! Independent half-close state for the read and write sides.
//!
//! Two boolean flags; once a flag is set it never clears for that instance.
//! Every derived read or write operation checks its side before touching any
//! primitive, so a closed half fails with `ClosedStream` without side
//! effects on the backend.

use crate::error::{Result, StreamError};
use crate::stream::Stream;

/// Closed flags for the two directions of a stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClosedState {
    read_closed: bool,
    write_closed: bool,
}

impl ClosedState {
    /// Both sides open.
    #[must_use]
    pub const fn open() -> Self {
        Self {
            read_closed: false,
            write_closed: false,
        }
    }

    /// Is the read side closed?
    #[must_use]
    pub const fn is_read_closed(&self) -> bool {
        self.read_closed
    }

    /// Is the write side closed?
    #[must_use]
    pub const fn is_write_closed(&self) -> bool {
        self.write_closed
    }

    /// Fully closed: both sides.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.read_closed && self.write_closed
    }

    /// Marks the read side closed. Returns true on the open-to-closed
    /// transition, false if it was already closed.
    pub fn close_read(&mut self) -> bool {
        !std::mem::replace(&mut self.read_closed, true)
    }

    /// Marks the write side closed. Returns true on the open-to-closed
    /// transition, false if it was already closed.
    pub fn close_write(&mut self) -> bool {
        !std::mem::replace(&mut self.write_closed, true)
    }

    /// Fails with `ClosedStream` if the read side is closed.
    pub const fn check_read_open(&self) -> Result<()> {
        if self.read_closed {
            Err(StreamError::ClosedStream)
        } else {
            Ok(())
        }
    }

    /// Fails with `ClosedStream` if the write side is closed.
    pub const fn check_write_open(&self) -> Result<()> {
        if self.write_closed {
            Err(StreamError::ClosedStream)
        } else {
            Ok(())
        }
    }
}

/// Half-close capability.
///
/// Backends may override [`Closable::on_close_read`] /
/// [`Closable::on_close_write`] to release underlying resources; the hooks
/// fire at most once per side, on the open-to-closed transition.
pub trait Closable: Stream {
    /// Backend hook for closing the read side.
    fn on_close_read(&mut self) -> Result<()> {
        Ok(())
    }

    /// Backend hook for closing the write side.
    fn on_close_write(&mut self) -> Result<()> {
        Ok(())
    }

    /// Closes both sides. Idempotent.
    fn close(&mut self) -> Result<()> {
        self.close_read()?;
        self.close_write()
    }

    /// Closes the read side. Idempotent.
    fn close_read(&mut self) -> Result<()> {
        if self.core_mut().closed.close_read() {
            tracing::trace!("read side closed");
            self.on_close_read()?;
        }
        Ok(())
    }

    /// Closes the write side. Idempotent.
    fn close_write(&mut self) -> Result<()> {
        if self.core_mut().closed.close_write() {
            tracing::trace!("write side closed");
            self.on_close_write()?;
        }
        Ok(())
    }

    /// Fully closed: both sides.
    fn is_closed(&self) -> bool {
        self.core().closed.is_closed()
    }

    /// Is the read side closed?
    fn is_read_closed(&self) -> bool {
        self.core().closed.is_read_closed()
    }

    /// Is the write side closed?
    fn is_write_closed(&self) -> bool {
        self.core().closed.is_write_closed()
    }
}
