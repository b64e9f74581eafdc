//! Stream Capability Conformance Suite
//!
//! End-to-end verification of the capability layer contracts:
//! - Derived bulk/delimited reads reproduce native bulk primitives
//! - Delimited read window semantics under a byte limit
//! - Three-way non-blocking read protocol in `read_partial`
//! - Half-close independence and idempotence
//! - Encoding configuration: raw-byte reads vs decoded char reads
//! - Push-back re-reads
//!
//! Backends used: `MemoryStream` (native bulk primitives) and a local
//! byte-only backend that overrides nothing but `prim_read_byte`/`prim_eof`.

#![allow(missing_docs)]

use primio::test_utils::init_test_logging;
use primio::{assert_with_log, test_complete, test_phase, test_section};
use primio::{
    Buffered, Closable, ConverterOptions, EncodingSpec, LineParams, MemoryStream, ReadChunk,
    Readable, Result, Seekable, SeekFrom, Stream, StreamCore, StreamError, Text, Writable,
};

fn init_test(test_name: &str) {
    init_test_logging();
    test_phase!(test_name);
}

/// Backend exposing only the minimal readable primitives.
struct ByteOnly {
    core: StreamCore,
    data: Vec<u8>,
    pos: usize,
}

impl ByteOnly {
    fn new(data: &[u8]) -> Self {
        Self {
            core: StreamCore::new(),
            data: data.to_vec(),
            pos: 0,
        }
    }
}

impl Stream for ByteOnly {
    fn core(&self) -> &StreamCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StreamCore {
        &mut self.core
    }
}

impl Closable for ByteOnly {}

impl Readable for ByteOnly {
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
}

/// Duplex backend: reads from one buffer, writes to another, and can
/// simulate a would-block period on the non-blocking path.
struct Duplex {
    core: StreamCore,
    input: Vec<u8>,
    pos: usize,
    output: Vec<u8>,
    block_reads: usize,
}

impl Duplex {
    fn new(input: &[u8]) -> Self {
        Self {
            core: StreamCore::new(),
            input: input.to_vec(),
            pos: 0,
            output: Vec::new(),
            block_reads: 0,
        }
    }
}

impl Stream for Duplex {
    fn core(&self) -> &StreamCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StreamCore {
        &mut self.core
    }
}

impl Closable for Duplex {}

impl Readable for Duplex {
    fn prim_eof(&mut self) -> Result<bool> {
        Ok(self.pos >= self.input.len())
    }

    fn prim_read_byte(&mut self) -> Result<Option<u8>> {
        let b = self.input.get(self.pos).copied();
        if b.is_some() {
            self.pos += 1;
        }
        Ok(b)
    }

    fn prim_read_nonblock(&mut self, maxlen: usize) -> Result<ReadChunk> {
        if self.pos >= self.input.len() {
            return Ok(ReadChunk::End);
        }
        if self.block_reads > 0 {
            self.block_reads -= 1;
            return Ok(ReadChunk::WouldBlock);
        }
        let end = (self.pos + maxlen).min(self.input.len());
        let chunk = self.input[self.pos..end].to_vec();
        self.pos = end;
        Ok(ReadChunk::Data(chunk))
    }
}

impl Writable for Duplex {
    fn prim_write(&mut self, bytes: &[u8]) -> Result<usize> {
        self.output.extend_from_slice(bytes);
        Ok(bytes.len())
    }
}

// ============================================================================
// DERIVED-VS-NATIVE EQUIVALENCE
// ============================================================================

/// The byte-at-a-time defaults must reproduce a native bulk backend
/// byte-for-byte, for both plain and delimited reads.
#[test]
fn derived_defaults_match_native_bulk() {
    init_test("derived_defaults_match_native_bulk");

    let corpora: &[&[u8]] = &[
        b"",
        b"a",
        b"ab\ncd",
        b"\n\n\n",
        b"no delimiter at all",
        b"ends with delim--",
        b"--leading",
        &[0x00, 0xFF, 0x7F, 0x0A, 0x00],
    ];

    test_section!("prim_read");
    for data in corpora {
        for length in [None, Some(0), Some(1), Some(3), Some(1024)] {
            let mut derived = ByteOnly::new(data);
            let mut native = MemoryStream::from_bytes(data);
            let a = derived.prim_read(length).unwrap();
            let b = native.prim_read(length).unwrap();
            assert_with_log!(a == b, "prim_read equivalence", b, a);
        }
    }

    test_section!("prim_read_until");
    for data in corpora {
        for delim in [b"\n".as_slice(), b"--".as_slice()] {
            for limit in [None, Some(0), Some(2), Some(4), Some(100)] {
                let mut derived = ByteOnly::new(data);
                let mut native = MemoryStream::from_bytes(data);
                let a = derived.prim_read_until(delim, limit).unwrap();
                let b = native.prim_read_until(delim, limit).unwrap();
                assert_with_log!(a == b, "prim_read_until equivalence", b, a);
            }
        }
    }

    test_complete!("derived_defaults_match_native_bulk");
}

/// Repeated delimited reads drain both backends identically.
#[test]
fn repeated_delimited_reads_drain_identically() {
    init_test("repeated_delimited_reads_drain_identically");
    let data = b"one\ntwo\nthree";
    let mut derived = ByteOnly::new(data);
    let mut native = MemoryStream::from_bytes(data);
    loop {
        let a = derived.prim_read_until(b"\n", None).unwrap();
        let b = native.prim_read_until(b"\n", None).unwrap();
        assert_with_log!(a == b, "chunk equivalence", b, a);
        if a.is_none() {
            break;
        }
    }
    test_complete!("repeated_delimited_reads_drain_identically");
}

// ============================================================================
// DELIMITED READ WINDOW SEMANTICS
// ============================================================================

#[test]
fn read_until_limit_window() {
    init_test("read_until_limit_window");

    test_section!("delimiter inside window");
    let mut s = ByteOnly::new(b"head\ntail");
    let hit = s.prim_read_until(b"\n", Some(8)).unwrap().unwrap();
    assert_with_log!(hit == b"head\n".to_vec(), "chunk ends in delim", b"head\n", hit);

    test_section!("delimiter outside window");
    let mut s = ByteOnly::new(b"head\ntail");
    let window = s.prim_read_until(b"\n", Some(3)).unwrap().unwrap();
    assert_with_log!(window == b"hea".to_vec(), "exactly limit bytes", b"hea", window);

    test_section!("empty stream");
    let mut s = ByteOnly::new(b"");
    let end = s.prim_read_until(b"\n", Some(3)).unwrap();
    assert_with_log!(end.is_none(), "end marker", true, end.is_none());

    test_complete!("read_until_limit_window");
}

// ============================================================================
// NON-BLOCKING READ PROTOCOL
// ============================================================================

#[test]
fn read_partial_never_leaks_sentinel() {
    init_test("read_partial_never_leaks_sentinel");

    test_section!("data available");
    let mut s = Duplex::new(b"abcdef");
    let chunk = s.read_partial(4).unwrap();
    let in_range = !chunk.is_empty() && chunk.len() <= 4;
    assert_with_log!(in_range, "1..=n bytes", true, in_range);

    test_section!("would-block falls back to blocking read");
    let mut s = Duplex::new(b"abc");
    s.block_reads = 2;
    let chunk = s.read_partial(2).unwrap();
    assert_with_log!(chunk == b"ab".to_vec(), "fallback data", b"ab", chunk);

    test_section!("end of stream raises");
    let mut s = Duplex::new(b"");
    let err = s.read_partial(1);
    let eos = matches!(err, Err(StreamError::EndOfStream));
    assert_with_log!(eos, "EndOfStream", true, eos);

    test_section!("caller-facing sentinel via read_nonblock");
    let mut s = Duplex::new(b"abc");
    s.block_reads = 1;
    let raw = s.read_nonblock(2).unwrap();
    assert_with_log!(raw == ReadChunk::WouldBlock, "sentinel exposed", ReadChunk::WouldBlock, raw);

    test_complete!("read_partial_never_leaks_sentinel");
}

// ============================================================================
// HALF-CLOSE
// ============================================================================

#[test]
fn close_twice_equals_once() {
    init_test("close_twice_equals_once");
    let mut s = MemoryStream::from_bytes(b"x");
    s.close().unwrap();
    let closed_once = s.is_closed();
    s.close().unwrap();
    let closed_twice = s.is_closed();
    assert_with_log!(closed_once && closed_twice, "idempotent", true, closed_twice);
    test_complete!("close_twice_equals_once");
}

#[test]
fn read_half_close_leaves_write_side_usable() {
    init_test("read_half_close_leaves_write_side_usable");
    let mut s = Duplex::new(b"unreadable");
    s.close_read().unwrap();

    let read_err = s.read(None);
    let gated = matches!(read_err, Err(StreamError::ClosedStream));
    assert_with_log!(gated, "read gated", true, gated);

    let written = s.write(b"still writable").unwrap();
    assert_with_log!(written == 14, "write succeeds", 14, written);
    assert_with_log!(
        s.output == b"still writable".to_vec(),
        "bytes arrived",
        b"still writable",
        s.output
    );
    test_complete!("read_half_close_leaves_write_side_usable");
}

// ============================================================================
// ENCODING
// ============================================================================

#[test]
fn cleared_encoding_reads_raw_bytes() {
    init_test("cleared_encoding_reads_raw_bytes");
    let raw = [0xC3, 0xA9, 0xFF];
    let mut s = MemoryStream::from_bytes(&raw);
    s.set_encoding(EncodingSpec::Clear, &ConverterOptions::default())
        .unwrap();
    let bytes = s.read(None).unwrap().unwrap();
    assert_with_log!(bytes == raw.to_vec(), "untranscoded", &raw, bytes);
    test_complete!("cleared_encoding_reads_raw_bytes");
}

#[test]
fn two_byte_sequence_is_one_char() {
    init_test("two_byte_sequence_is_one_char");
    let mut s = MemoryStream::from_bytes("é".as_bytes());
    s.set_encoding("utf-8:utf-8".parse().unwrap(), &ConverterOptions::default())
        .unwrap();
    let chars: Result<Vec<Text>> = s.chars().collect();
    let chars = chars.unwrap();
    assert_with_log!(chars.len() == 1, "one char, not two", 1, chars.len());
    assert_with_log!(chars[0] == "é", "decoded", "é", chars[0].to_string_lossy());
    test_complete!("two_byte_sequence_is_one_char");
}

#[test]
fn external_only_spec_assembles_multibyte_chars() {
    init_test("external_only_spec_assembles_multibyte_chars");
    // Single "EXT" form: identity converter, but the char path still
    // groups bytes by character under the external encoding.
    let mut s = MemoryStream::from_bytes("é".as_bytes());
    s.set_encoding("utf-8".parse().unwrap(), &ConverterOptions::default())
        .unwrap();
    let chars: Result<Vec<Text>> = s.chars().collect();
    let chars = chars.unwrap();
    assert_with_log!(chars.len() == 1, "one char, not two", 1, chars.len());
    assert_with_log!(chars[0] == "é", "decoded", "é", chars[0].to_string_lossy());
    test_complete!("external_only_spec_assembles_multibyte_chars");
}

#[test]
fn transcoding_line_read() {
    init_test("transcoding_line_read");
    // windows-1252 "café\n" -> UTF-8 text out of gets.
    let mut s = MemoryStream::from_bytes(&[b'c', b'a', b'f', 0xE9, b'\n']);
    s.set_encoding(
        "windows-1252:utf-8".parse().unwrap(),
        &ConverterOptions::default(),
    )
    .unwrap();
    let line = s.gets(()).unwrap().unwrap();
    assert_with_log!(line == "café\n", "transcoded line", "café\n", line.to_string_lossy());
    test_complete!("transcoding_line_read");
}

#[test]
fn invalid_separator_encoding_rejected() {
    init_test("invalid_separator_encoding_rejected");
    let mut s = MemoryStream::from_bytes(b"data");
    s.set_encoding("utf-8".parse().unwrap(), &ConverterOptions::default())
        .unwrap();
    // 0xFF is not valid UTF-8, so it cannot be a separator for this stream.
    let err = s.gets(LineParams::new().separator(vec![0xFF]));
    let rejected = matches!(err, Err(StreamError::InvalidEncoding { .. }));
    assert_with_log!(rejected, "separator rejected", true, rejected);
    test_complete!("invalid_separator_encoding_rejected");
}

// ============================================================================
// LINE READING OVER A MINIMAL BACKEND
// ============================================================================

#[test]
fn gets_sequence_over_byte_only_backend() {
    init_test("gets_sequence_over_byte_only_backend");
    let mut s = ByteOnly::new(b"ab\ncd");
    let first = s.gets(()).unwrap().unwrap();
    assert_with_log!(first == "ab\n", "first", "ab\n", first.to_string_lossy());
    let second = s.gets(()).unwrap().unwrap();
    assert_with_log!(second == "cd", "second", "cd", second.to_string_lossy());
    let third = s.gets(()).unwrap();
    assert_with_log!(third.is_none(), "null signal at end", true, third.is_none());
    test_complete!("gets_sequence_over_byte_only_backend");
}

#[test]
fn read_line_raises_where_gets_returns_none() {
    init_test("read_line_raises_where_gets_returns_none");
    let mut s = ByteOnly::new(b"only\n");
    s.read_line(()).unwrap();
    let err = s.read_line(());
    let eos = matches!(err, Err(StreamError::EndOfStream));
    assert_with_log!(eos, "strict variant raises", true, eos);
    test_complete!("read_line_raises_where_gets_returns_none");
}

// ============================================================================
// PUSH-BACK AND RANDOM ACCESS
// ============================================================================

#[test]
fn unget_byte_rereads_before_backend() {
    init_test("unget_byte_rereads_before_backend");
    let mut s = Buffered::new(MemoryStream::from_bytes(b"AB"));
    let a = s.read_byte().unwrap();
    assert_with_log!(a == 0x41, "read A", 0x41, a);
    s.unget_byte(a);
    let again = s.read_byte().unwrap();
    assert_with_log!(again == 0x41, "A again", 0x41, again);
    let next = s.read_byte().unwrap();
    assert_with_log!(next == 0x42, "then B", 0x42, next);
    test_complete!("unget_byte_rereads_before_backend");
}

#[test]
fn rewind_restarts_lines_and_counter() {
    init_test("rewind_restarts_lines_and_counter");
    use primio::Counted;
    let mut s = MemoryStream::from_bytes(b"1\n2\n");
    let all = s.read_lines(()).unwrap();
    assert_with_log!(all.len() == 2, "two lines", 2, all.len());
    assert_with_log!(s.line_number() == 2, "counter", 2, s.line_number());
    s.rewind().unwrap();
    assert_with_log!(s.line_number() == 0, "counter reset", 0, s.line_number());
    let pos = s.tell().unwrap();
    assert_with_log!(pos == 0, "position reset", 0, pos);
    test_complete!("rewind_restarts_lines_and_counter");
}

#[test]
fn buffered_decorator_preserves_seek_capability() {
    init_test("buffered_decorator_preserves_seek_capability");
    let mut s = Buffered::new(MemoryStream::from_bytes(b"xyz"));
    s.read_byte().unwrap();
    s.unget_byte(b'q');
    let pos = s.seek(SeekFrom::Start(2)).unwrap();
    assert_with_log!(pos == 2, "seek through decorator", 2, pos);
    let b = s.read_byte().unwrap();
    assert_with_log!(b == b'z', "pushback dropped by seek", b'z', b);
    test_complete!("buffered_decorator_preserves_seek_capability");
}
