//! Primio: a capability-based, composable stream layer.
//!
//! # Overview
//!
//! Primio lets any minimal byte-producing or byte-consuming primitive be
//! decorated, without rewriting, into a full-featured stream: encoding-aware
//! text reads, byte/char/line iteration, non-blocking reads, independent
//! half-close of the read and write sides, and optional random access.
//!
//! A backend implements a handful of *primitive hooks*; the capability
//! traits derive everything else. A readable backend needs exactly one
//! method ([`Readable::prim_read_byte`]) to gain the full derived surface.
//!
//! # Core Contracts
//!
//! - **Primitives up, never down**: derived operations call only primitive
//!   hooks; backends never need to know the derived surface exists
//! - **Three-way non-blocking protocol**: non-blocking reads distinguish
//!   data, would-block, and end of stream; `read_partial` resolves
//!   would-block by falling back to a blocking read
//! - **Byte paths stay raw**: the encoding converter is applied only by the
//!   char and line paths; the char path groups bytes per character under
//!   the effective external encoding
//! - **Half-close gates first**: a closed half fails `ClosedStream` before
//!   any primitive is touched, and a closed flag never resets
//!
//! # Module Structure
//!
//! - [`stream`]: Base trait and per-instance state ([`StreamCore`])
//! - [`encoding`]: External/internal encodings and the byte-to-text converter
//! - [`read`]: Readable capability (primitive hooks + derived reads)
//! - [`write`]: Writable capability
//! - [`close`]: Independent read/write half-close
//! - [`buffered`]: Push-back decorator (`unget_byte`/`unget_text`)
//! - [`seek`]: Random access capability
//! - [`counted`]: Line-number counting
//! - [`iter`]: Lazy byte/char/line iterators
//! - [`mem`]: In-memory reference backend
//! - [`text`]: Encoding-tagged byte strings
//! - [`error`]: Error types
//!
//! # Concurrency
//!
//! Single-threaded cooperative model. "Non-blocking" means "return a
//! sentinel instead of suspending"; nothing here schedules work, and no
//! instance is safe to share across execution contexts without external
//! synchronization.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod buffered;
pub mod close;
pub mod counted;
pub mod encoding;
pub mod error;
pub mod iter;
pub mod mem;
pub mod read;
pub mod seek;
pub mod stream;
pub mod test_utils;
pub mod text;
pub mod write;

// Re-exports for convenient access to the capability surface
pub use buffered::Buffered;
pub use close::{Closable, ClosedState};
pub use counted::Counted;
pub use encoding::{
    make_converter, Converter, ConverterOptions, EncodingId, EncodingSpec, EncodingState,
    ReplacementPolicy,
};
pub use error::{Result, StreamError};
pub use iter::{Bytes, Chars, Lines};
pub use mem::MemoryStream;
pub use read::{LineParams, ReadChunk, Readable, DEFAULT_SEPARATOR};
pub use seek::{Seekable, SeekFrom};
pub use stream::{Stream, StreamCore};
pub use text::Text;
pub use write::{Writable, WriteChunk};
