//! The Writable capability: two primitive write hooks plus derived
//! convenience writers.
//!
//! Backends supply [`Writable::prim_write`] (and
//! [`Writable::prim_write_nonblock`] if they can report would-block); the
//! formatting and newline conventions live entirely in the derived layer.
//! Every derived entry point checks the write side of the close state first.

use crate::close::Closable;
use crate::error::{Result, StreamError};
use std::fmt;

/// Result of a non-blocking write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteChunk {
    /// Number of bytes accepted.
    Wrote(usize),
    /// Nothing could be accepted without blocking.
    WouldBlock,
}

/// Writable capability.
pub trait Writable: Closable {
    /// Writes some prefix of `bytes`, returning how many were accepted.
    ///
    /// The one hook a minimal writable backend must implement. May accept
    /// fewer bytes than offered.
    fn prim_write(&mut self, bytes: &[u8]) -> Result<usize> {
        let _ = bytes;
        Err(StreamError::not_implemented("write"))
    }

    /// Writes without blocking, or reports [`WriteChunk::WouldBlock`].
    ///
    /// Any timeout policy belongs here, expressed by returning the
    /// would-block sentinel.
    fn prim_write_nonblock(&mut self, bytes: &[u8]) -> Result<WriteChunk> {
        let _ = bytes;
        Err(StreamError::not_implemented("write_nonblock"))
    }

    /// Backend hook for flushing buffered output. Default: nothing to do.
    fn prim_flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Writes the whole slice, looping over the primitive as needed.
    /// Returns the number of bytes written. In sync mode the backend is
    /// flushed before returning.
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.core().closed.check_write_open()?;
        let mut written = 0;
        while written < data.len() {
            let n = self.prim_write(&data[written..])?;
            if n == 0 {
                // Backend refuses to make progress; surface what we have.
                break;
            }
            written += n;
        }
        if self.core().sync {
            self.prim_flush()?;
        }
        Ok(written)
    }

    /// Single non-blocking write attempt; the sentinel passes through.
    fn write_nonblock(&mut self, data: &[u8]) -> Result<WriteChunk> {
        self.core().closed.check_write_open()?;
        self.prim_write_nonblock(data)
    }

    /// Flushes buffered output through the backend hook.
    fn flush(&mut self) -> Result<()> {
        self.core().closed.check_write_open()?;
        self.prim_flush()
    }

    /// Coerces a value to its text form and writes it. Chainable; this is
    /// the append (`<<`) operator.
    fn append<D: fmt::Display>(&mut self, value: D) -> Result<&mut Self>
    where
        Self: Sized,
    {
        self.write(value.to_string().as_bytes())?;
        Ok(self)
    }

    /// Writes each argument's text form, nothing between them.
    fn print(&mut self, args: &[&dyn fmt::Display]) -> Result<()> {
        for arg in args {
            self.write(arg.to_string().as_bytes())?;
        }
        Ok(())
    }

    /// Writes formatted text; pair with `format_args!`.
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<()> {
        self.write(fmt::format(args).as_bytes())?;
        Ok(())
    }

    /// Writes a single character.
    fn put_char(&mut self, c: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.write(c.encode_utf8(&mut buf).as_bytes())?;
        Ok(())
    }

    /// Writes each argument followed by a newline, without doubling a
    /// newline the argument already ends with. No arguments writes a bare
    /// newline.
    fn puts(&mut self, args: &[&dyn fmt::Display]) -> Result<()> {
        if args.is_empty() {
            self.write(b"\n")?;
            return Ok(());
        }
        for arg in args {
            let s = arg.to_string();
            self.write(s.as_bytes())?;
            if !s.ends_with('\n') {
                self.write(b"\n")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{Stream, StreamCore};

    /// Backend accepting at most `chunk` bytes per primitive call.
    struct Trickle {
        core: StreamCore,
        sink: Vec<u8>,
        chunk: usize,
        flushes: usize,
    }

    impl Trickle {
        fn new(chunk: usize) -> Self {
            Self {
                core: StreamCore::new(),
                sink: Vec::new(),
                chunk,
                flushes: 0,
            }
        }
    }

    impl Stream for Trickle {
        fn core(&self) -> &StreamCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut StreamCore {
            &mut self.core
        }
    }

    impl Closable for Trickle {}

    impl Writable for Trickle {
        fn prim_write(&mut self, bytes: &[u8]) -> Result<usize> {
            let n = bytes.len().min(self.chunk);
            self.sink.extend_from_slice(&bytes[..n]);
            Ok(n)
        }

        fn prim_write_nonblock(&mut self, bytes: &[u8]) -> Result<WriteChunk> {
            if self.sink.len() >= 4 {
                return Ok(WriteChunk::WouldBlock);
            }
            let n = bytes.len().min(self.chunk);
            self.sink.extend_from_slice(&bytes[..n]);
            Ok(WriteChunk::Wrote(n))
        }

        fn prim_flush(&mut self) -> Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    fn init_test(name: &str) {
        crate::test_utils::init_test_logging();
        crate::test_phase!(name);
    }

    #[test]
    fn write_loops_over_short_primitive() {
        init_test("write_loops_over_short_primitive");
        let mut s = Trickle::new(2);
        let n = s.write(b"hello world").unwrap();
        crate::assert_with_log!(n == 11, "all bytes written", 11, n);
        crate::assert_with_log!(
            s.sink == b"hello world".to_vec(),
            "sink contents",
            b"hello world",
            s.sink
        );
        crate::test_complete!("write_loops_over_short_primitive");
    }

    #[test]
    fn write_nonblock_passes_sentinel() {
        init_test("write_nonblock_passes_sentinel");
        let mut s = Trickle::new(8);
        let first = s.write_nonblock(b"full").unwrap();
        crate::assert_with_log!(
            first == WriteChunk::Wrote(4),
            "first write",
            WriteChunk::Wrote(4),
            first
        );
        let second = s.write_nonblock(b"more").unwrap();
        crate::assert_with_log!(
            second == WriteChunk::WouldBlock,
            "sentinel",
            WriteChunk::WouldBlock,
            second
        );
        crate::test_complete!("write_nonblock_passes_sentinel");
    }

    #[test]
    fn append_chains_and_coerces() {
        init_test("append_chains_and_coerces");
        let mut s = Trickle::new(64);
        s.append("n=").unwrap().append(42).unwrap();
        crate::assert_with_log!(s.sink == b"n=42".to_vec(), "coerced", b"n=42", s.sink);
        crate::test_complete!("append_chains_and_coerces");
    }

    #[test]
    fn puts_newline_rules() {
        init_test("puts_newline_rules");
        let mut s = Trickle::new(64);
        s.puts(&[]).unwrap();
        s.puts(&[&"plain"]).unwrap();
        s.puts(&[&"kept\n"]).unwrap();
        crate::assert_with_log!(
            s.sink == b"\nplain\nkept\n".to_vec(),
            "newline rules",
            b"\\nplain\\nkept\\n",
            s.sink
        );
        crate::test_complete!("puts_newline_rules");
    }

    #[test]
    fn formatted_write() {
        init_test("formatted_write");
        let mut s = Trickle::new(64);
        s.write_fmt(format_args!("{}-{:02}", "x", 7)).unwrap();
        crate::assert_with_log!(s.sink == b"x-07".to_vec(), "formatted", b"x-07", s.sink);
        s.put_char('€').unwrap();
        crate::assert_with_log!(
            s.sink.ends_with("€".as_bytes()),
            "char written",
            true,
            s.sink.ends_with("€".as_bytes())
        );
        crate::test_complete!("formatted_write");
    }

    #[test]
    fn closed_write_side_gates_everything() {
        init_test("closed_write_side_gates_everything");
        let mut s = Trickle::new(64);
        s.close_write().unwrap();
        let gated = matches!(s.write(b"x"), Err(StreamError::ClosedStream))
            && matches!(s.write_nonblock(b"x"), Err(StreamError::ClosedStream))
            && matches!(s.puts(&[&"x"]), Err(StreamError::ClosedStream))
            && matches!(s.flush(), Err(StreamError::ClosedStream));
        crate::assert_with_log!(gated, "all writes gated", true, gated);
        // Sink untouched: the primitive was never reached.
        let empty = s.sink.is_empty();
        crate::assert_with_log!(empty, "sink untouched", true, empty);
        crate::test_complete!("closed_write_side_gates_everything");
    }

    #[test]
    fn sync_mode_flushes_every_write() {
        init_test("sync_mode_flushes_every_write");
        let mut s = Trickle::new(64);
        let default_sync = s.is_sync();
        crate::assert_with_log!(!default_sync, "sync off by default", false, default_sync);
        s.write(b"a").unwrap();
        crate::assert_with_log!(s.flushes == 0, "no flush unsynced", 0, s.flushes);
        s.set_sync(true);
        s.write(b"b").unwrap();
        s.puts(&[&"c"]).unwrap();
        // puts writes the text and the newline separately.
        crate::assert_with_log!(s.flushes == 3, "flushed per write", 3, s.flushes);
        crate::test_complete!("sync_mode_flushes_every_write");
    }

    #[test]
    fn flush_reaches_backend_hook() {
        init_test("flush_reaches_backend_hook");
        let mut s = Trickle::new(64);
        s.flush().unwrap();
        crate::assert_with_log!(s.flushes == 1, "hook fired", 1, s.flushes);
        crate::test_complete!("flush_reaches_backend_hook");
    }
}
