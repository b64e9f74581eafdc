//! Line-number counting.
//!
//! The counter lives in [`StreamCore`](crate::StreamCore) and is advanced by
//! the line-returning reads (`gets`, `read_line`, the `Lines` iterator). It
//! is explicitly settable and reset to zero by
//! [`Seekable::rewind`](crate::Seekable::rewind).

use crate::stream::Stream;

/// Line-counter access, available on every stream.
pub trait Counted: Stream {
    /// Number of lines returned so far.
    fn line_number(&self) -> u64 {
        self.core().line_number
    }

    /// Overrides the line counter.
    fn set_line_number(&mut self, n: u64) {
        self.core_mut().line_number = n;
    }
}

impl<S: Stream + ?Sized> Counted for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::MemoryStream;
    use crate::read::Readable;

    fn init_test(name: &str) {
        crate::test_utils::init_test_logging();
        crate::test_phase!(name);
    }

    #[test]
    fn line_reads_advance_counter() {
        init_test("line_reads_advance_counter");
        let mut s = MemoryStream::from_bytes(b"x\ny\nz");
        crate::assert_with_log!(s.line_number() == 0, "starts at zero", 0, s.line_number());
        s.gets(()).unwrap();
        s.read_line(()).unwrap();
        let lineno = s.line_number();
        crate::assert_with_log!(lineno == 2, "after two reads", 2, lineno);
        // Byte reads never touch the counter.
        s.read_byte().unwrap();
        let lineno = s.line_number();
        crate::assert_with_log!(lineno == 2, "byte read ignored", 2, lineno);
        crate::test_complete!("line_reads_advance_counter");
    }

    #[test]
    fn counter_is_settable() {
        init_test("counter_is_settable");
        let mut s = MemoryStream::from_bytes(b"x\ny\n");
        s.set_line_number(41);
        s.gets(()).unwrap();
        let lineno = s.line_number();
        crate::assert_with_log!(lineno == 42, "continues from set value", 42, lineno);
        crate::test_complete!("counter_is_settable");
    }
}
