//! Stream encoding state: external/internal encodings and the derived
//! byte-to-text converter.
//!
//! Every stream instance owns one [`EncodingState`]. The state is mutated
//! only through `set_encoding`/`binmode` on the base stream trait, and the
//! converter is rebuilt immediately whenever either encoding changes. A
//! failed spec leaves the state untouched.
//!
//! The conversion engine itself is a collaborator consumed through
//! [`make_converter`]; the default implementation is built on `encoding_rs`.

mod converter;

pub use converter::{make_converter, Converter, ConverterOptions, ReplacementPolicy};

use crate::error::{Result, StreamError};
use crate::text::Text;
use std::fmt;
use std::str::FromStr;

/// Identifies an encoding a stream can be configured with.
///
/// `Binary` is the "no interpretation" encoding (Ruby calls it ASCII-8BIT);
/// every byte sequence is valid under it and it can never be a transcoding
/// endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingId {
    /// Raw bytes, no character interpretation.
    Binary,
    /// A named character encoding.
    Named(&'static encoding_rs::Encoding),
}

impl EncodingId {
    /// UTF-8, the process-wide default external encoding.
    #[must_use]
    pub fn utf8() -> Self {
        Self::Named(encoding_rs::UTF_8)
    }

    /// Resolves an encoding label.
    ///
    /// `"binary"` and `"ascii-8bit"` (case-insensitive) select
    /// [`EncodingId::Binary`]; anything else goes through the WHATWG label
    /// registry.
    pub fn parse(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        if trimmed.eq_ignore_ascii_case("binary") || trimmed.eq_ignore_ascii_case("ascii-8bit") {
            return Ok(Self::Binary);
        }
        encoding_rs::Encoding::for_label(trimmed.as_bytes())
            .map(Self::Named)
            .ok_or_else(|| StreamError::invalid_encoding(format!("unknown encoding {label:?}")))
    }

    /// Canonical name of the encoding.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Binary => "BINARY",
            Self::Named(enc) => enc.name(),
        }
    }

    /// Returns true if `bytes` form a valid sequence under this encoding.
    ///
    /// Under `Binary` every sequence is valid.
    #[must_use]
    pub fn validates(&self, bytes: &[u8]) -> bool {
        match self {
            Self::Binary => true,
            Self::Named(enc) => {
                if *enc == encoding_rs::UTF_8 {
                    return std::str::from_utf8(bytes).is_ok();
                }
                let mut decoder = enc.new_decoder_without_bom_handling();
                let mut out = String::with_capacity(
                    decoder
                        .max_utf8_buffer_length_without_replacement(bytes.len())
                        .unwrap_or(bytes.len() * 3 + 4),
                );
                let (result, _read) =
                    decoder.decode_to_string_without_replacement(bytes, &mut out, true);
                matches!(result, encoding_rs::DecoderResult::InputEmpty)
            }
        }
    }
}

impl fmt::Display for EncodingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An encoding configuration request, as accepted by `set_encoding`.
///
/// Mirrors the accepted spellings: clearing, a single external encoding, or
/// an external/internal pair. The string form parses `"EXT"` and
/// `"EXT:INT"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingSpec {
    /// No conversion, raw bytes. Clears both encodings.
    Clear,
    /// External encoding only; internal encoding is cleared.
    External(EncodingId),
    /// External and internal encodings; reads transcode between them.
    Pair(EncodingId, EncodingId),
}

impl From<EncodingId> for EncodingSpec {
    fn from(id: EncodingId) -> Self {
        Self::External(id)
    }
}

impl FromStr for EncodingSpec {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            None => Ok(Self::External(EncodingId::parse(s)?)),
            Some((ext, int)) => {
                if ext.trim().is_empty() || int.trim().is_empty() {
                    return Err(StreamError::invalid_encoding(format!(
                        "malformed encoding spec {s:?}"
                    )));
                }
                Ok(Self::Pair(EncodingId::parse(ext)?, EncodingId::parse(int)?))
            }
        }
    }
}

/// Per-stream encoding state.
///
/// Holds the configured external/internal encodings, the binary-mode flag,
/// and the converter derived from them.
#[derive(Debug)]
pub struct EncodingState {
    external: Option<EncodingId>,
    internal: Option<EncodingId>,
    binary_mode: bool,
    converter: Converter,
}

impl EncodingState {
    /// Fresh state: no encodings configured, identity converter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            external: None,
            internal: None,
            binary_mode: false,
            converter: Converter::identity(),
        }
    }

    /// The configured external encoding, if any.
    ///
    /// Fallback to the backend's intrinsic encoding happens one level up,
    /// in the stream trait.
    #[must_use]
    pub const fn external(&self) -> Option<EncodingId> {
        self.external
    }

    /// The configured internal encoding, if any.
    #[must_use]
    pub const fn internal(&self) -> Option<EncodingId> {
        self.internal
    }

    /// Returns true if `binmode` was applied.
    #[must_use]
    pub const fn is_binary_mode(&self) -> bool {
        self.binary_mode
    }

    /// Applies an encoding spec, rebuilding the converter.
    ///
    /// The new converter is built before any field is mutated, so a
    /// malformed spec leaves the state exactly as it was.
    pub fn apply(&mut self, spec: EncodingSpec, options: &ConverterOptions) -> Result<()> {
        let (external, internal) = match spec {
            EncodingSpec::Clear => (None, None),
            EncodingSpec::External(ext) => (Some(ext), None),
            EncodingSpec::Pair(ext, int) => (Some(ext), Some(int)),
        };
        let converter = make_converter(external, internal, options)?;
        self.external = external;
        self.internal = internal;
        self.converter = converter;
        tracing::debug!(
            external = external.map(|e| e.name()),
            internal = internal.map(|e| e.name()),
            "encoding changed"
        );
        Ok(())
    }

    /// Forces binary mode: external becomes `Binary`, internal is cleared,
    /// and the converter is identity. The flag never resets.
    pub fn set_binary(&mut self) {
        self.external = Some(EncodingId::Binary);
        self.internal = None;
        self.binary_mode = true;
        self.converter = Converter::identity();
        tracing::debug!("binary mode set");
    }

    /// Runs bytes through the converter.
    ///
    /// `fallback` is the effective external encoding to tag identity output
    /// with when no external encoding is configured.
    pub fn convert(&mut self, bytes: &[u8], fallback: EncodingId) -> Result<Text> {
        let tag = self.external.unwrap_or(fallback);
        self.converter.convert(bytes, tag)
    }
}

impl Default for EncodingState {
    fn default() -> Self {
        Self::new()
    }
}
