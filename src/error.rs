//! Error types for the stream layer.
//!
//! Error handling follows a strict surfacing policy:
//!
//! - Errors are explicit and typed (no stringly-typed errors)
//! - Nothing is recovered or retried inside this crate; retry policy belongs
//!   to the backend's primitive implementation or to the caller
//! - Null-returning read variants (`get_byte`, `get_char`, `gets`) signal
//!   "no data, not necessarily an error" with `Ok(None)`; the strict
//!   variants (`read_byte`, `read_char`, `read_line`) surface
//!   [`StreamError::EndOfStream`] instead

use thiserror::Error;

/// Error type for all stream operations.
#[derive(Debug, Error)]
pub enum StreamError {
    /// A required primitive hook was never overridden by the backend.
    ///
    /// This is a programming/integration error, not a runtime condition.
    #[error("primitive `{hook}` is not implemented by this stream")]
    NotImplemented {
        /// Name of the missing primitive hook.
        hook: &'static str,
    },

    /// Operation attempted on a closed (half-closed) stream.
    #[error("closed stream")]
    ClosedStream,

    /// A strict read variant reached the end of the stream.
    #[error("end of stream reached")]
    EndOfStream,

    /// Malformed encoding spec, unencodable conversion target, or data that
    /// is invalid under the configured encoding.
    #[error("invalid encoding: {detail}")]
    InvalidEncoding {
        /// Human-readable description of what was rejected.
        detail: String,
    },

    /// Seek target outside the bounds the backend supports.
    #[error("invalid seek to position {position}")]
    InvalidSeek {
        /// The rejected absolute position.
        position: i64,
    },
}

impl StreamError {
    /// Shorthand constructor for [`StreamError::NotImplemented`].
    #[must_use]
    pub const fn not_implemented(hook: &'static str) -> Self {
        Self::NotImplemented { hook }
    }

    /// Shorthand constructor for [`StreamError::InvalidEncoding`].
    #[must_use]
    pub fn invalid_encoding(detail: impl Into<String>) -> Self {
        Self::InvalidEncoding {
            detail: detail.into(),
        }
    }

    /// Returns true if this error is the end-of-stream condition.
    #[must_use]
    pub const fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::EndOfStream)
    }

    /// Returns true if this error is the closed-stream condition.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::ClosedStream)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StreamError>;
