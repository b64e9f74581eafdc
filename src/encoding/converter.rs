//! The byte-to-text conversion collaborator.
//!
//! [`make_converter`] builds a stateful, incremental [`Converter`] from an
//! external/internal encoding pair. Feeding it one byte of a multi-byte
//! sequence yields empty output until the character completes, which is what
//! the per-byte char path relies on.
//!
//! With no internal encoding the converter is the identity: bytes pass
//! through untranscoded and are tagged with the effective external encoding.

use crate::encoding::EncodingId;
use crate::error::{Result, StreamError};
use crate::text::Text;
use encoding_rs::{CoderResult, Decoder, DecoderResult, Encoder, EncoderResult};
use std::fmt;

/// What to do when input bytes are invalid under the external encoding, or
/// when a decoded character has no representation in the internal encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplacementPolicy {
    /// Substitute the encoding's replacement character and continue.
    #[default]
    Replace,
    /// Surface [`StreamError::InvalidEncoding`] immediately.
    Raise,
}

/// Pass-through transcoding options.
///
/// These are the recognized keys a caller may hand to `set_encoding`; the
/// stream layer itself only forwards them to the converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConverterOptions {
    /// Handling of byte sequences invalid under the external encoding.
    pub invalid: ReplacementPolicy,
    /// Handling of characters unmappable in the internal encoding.
    pub undefined: ReplacementPolicy,
}

/// Stateful incremental bytes-to-text converter.
pub struct Converter {
    kind: Kind,
}

enum Kind {
    Identity,
    Transcode(Transcode),
}

struct Transcode {
    decoder: Decoder,
    encoder: Option<Encoder>,
    internal: EncodingId,
    invalid: ReplacementPolicy,
    undefined: ReplacementPolicy,
}

impl Converter {
    /// The identity converter: tags bytes with the effective external
    /// encoding, no transcoding.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            kind: Kind::Identity,
        }
    }

    /// Converts a chunk of raw bytes.
    ///
    /// `tag` is the effective external encoding, used to label identity
    /// output. Transcoding converters tag output with the internal encoding
    /// instead. Output may be empty when the input ends mid-character.
    pub fn convert(&mut self, input: &[u8], tag: EncodingId) -> Result<Text> {
        match &mut self.kind {
            Kind::Identity => Ok(Text::new(input.to_vec(), tag)),
            Kind::Transcode(t) => t.convert(input),
        }
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Identity => f.write_str("Converter::Identity"),
            Kind::Transcode(t) => write!(f, "Converter::Transcode(-> {})", t.internal),
        }
    }
}

/// Builds a converter for an external/internal encoding pair.
///
/// With `internal == None` the result is the identity converter. Transcoding
/// requires a concrete, non-binary external encoding and an internal
/// encoding that can actually be encoded to (the UTF-16 family cannot).
pub fn make_converter(
    external: Option<EncodingId>,
    internal: Option<EncodingId>,
    options: &ConverterOptions,
) -> Result<Converter> {
    let Some(internal) = internal else {
        return Ok(Converter::identity());
    };

    let external = external.ok_or_else(|| {
        StreamError::invalid_encoding("internal encoding requires an external encoding")
    })?;
    let EncodingId::Named(source) = external else {
        return Err(StreamError::invalid_encoding("cannot transcode from BINARY"));
    };
    let EncodingId::Named(target) = internal else {
        return Err(StreamError::invalid_encoding("cannot transcode to BINARY"));
    };
    if target.output_encoding() != target {
        return Err(StreamError::invalid_encoding(format!(
            "cannot encode to {}",
            target.name()
        )));
    }

    let encoder = if target == encoding_rs::UTF_8 {
        None
    } else {
        Some(target.new_encoder())
    };
    Ok(Converter {
        kind: Kind::Transcode(Transcode {
            decoder: source.new_decoder_without_bom_handling(),
            encoder,
            internal,
            invalid: options.invalid,
            undefined: options.undefined,
        }),
    })
}

impl Transcode {
    fn convert(&mut self, input: &[u8]) -> Result<Text> {
        let utf8 = self.decode_step(input)?;
        match self.encoder.as_mut() {
            None => Ok(Text::new(utf8.into_bytes(), self.internal)),
            Some(encoder) => {
                let bytes = encode_step(encoder, &utf8, self.undefined)?;
                Ok(Text::new(bytes, self.internal))
            }
        }
    }

    fn decode_step(&mut self, input: &[u8]) -> Result<String> {
        let mut out = String::new();
        let mut pos = 0;
        loop {
            let remaining = input.len() - pos;
            out.reserve(
                self.decoder
                    .max_utf8_buffer_length(remaining)
                    .unwrap_or(remaining * 3 + 4)
                    .max(4),
            );
            match self.invalid {
                ReplacementPolicy::Replace => {
                    let (result, read, _had_errors) =
                        self.decoder.decode_to_string(&input[pos..], &mut out, false);
                    pos += read;
                    match result {
                        CoderResult::InputEmpty => return Ok(out),
                        CoderResult::OutputFull => {}
                    }
                }
                ReplacementPolicy::Raise => {
                    let (result, read) = self
                        .decoder
                        .decode_to_string_without_replacement(&input[pos..], &mut out, false);
                    pos += read;
                    match result {
                        DecoderResult::InputEmpty => return Ok(out),
                        DecoderResult::OutputFull => {}
                        DecoderResult::Malformed(_, _) => {
                            return Err(StreamError::invalid_encoding(
                                "malformed byte sequence in external encoding",
                            ));
                        }
                    }
                }
            }
        }
    }
}

fn encode_step(encoder: &mut Encoder, utf8: &str, undefined: ReplacementPolicy) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut pos = 0;
    loop {
        let remaining = utf8.len() - pos;
        out.reserve(
            encoder
                .max_buffer_length_from_utf8_without_replacement(remaining)
                .unwrap_or(remaining * 4 + 4)
                .max(4),
        );
        match undefined {
            ReplacementPolicy::Replace => {
                let (result, read, _had_errors) =
                    encoder.encode_from_utf8_to_vec(&utf8[pos..], &mut out, false);
                pos += read;
                match result {
                    CoderResult::InputEmpty => return Ok(out),
                    CoderResult::OutputFull => {}
                }
            }
            ReplacementPolicy::Raise => {
                let (result, read) =
                    encoder.encode_from_utf8_to_vec_without_replacement(&utf8[pos..], &mut out, false);
                pos += read;
                match result {
                    EncoderResult::InputEmpty => return Ok(out),
                    EncoderResult::OutputFull => {}
                    EncoderResult::Unmappable(c) => {
                        return Err(StreamError::invalid_encoding(format!(
                            "{c:?} has no representation in the internal encoding"
                        )));
                    }
                }
            }
        }
    }
}
