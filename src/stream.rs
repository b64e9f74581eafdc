//! The base stream trait and per-instance state.
//!
//! Every concrete stream owns exactly one [`StreamCore`] and exposes it
//! through the two accessor hooks on [`Stream`]. That is the only state
//! requirement the capability traits place on a backend; everything else is
//! primitive hooks.
//!
//! The state is deliberately unguarded: one owner, single-threaded
//! cooperative use. Sharing an instance across execution contexts requires
//! external synchronization.

use crate::close::ClosedState;
use crate::encoding::{ConverterOptions, EncodingId, EncodingSpec, EncodingState};
use crate::error::Result;
use crate::text::Text;

/// State owned by every stream instance.
#[derive(Debug, Default)]
pub struct StreamCore {
    pub(crate) encoding: EncodingState,
    pub(crate) closed: ClosedState,
    pub(crate) line_number: u64,
    pub(crate) sync: bool,
}

impl StreamCore {
    /// Fresh state: no encodings, both sides open, line counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Base capability: access to per-stream state plus encoding configuration.
///
/// Backends implement `core`/`core_mut` (usually one field) and may override
/// [`Stream::intrinsic_encoding`] and [`Stream::is_interactive`]. Everything
/// else is provided.
pub trait Stream {
    /// Shared per-stream state.
    fn core(&self) -> &StreamCore;

    /// Mutable access to the shared per-stream state.
    fn core_mut(&mut self) -> &mut StreamCore;

    /// The encoding native to this stream's source, used when no external
    /// encoding has been configured. Defaults to the process-wide default,
    /// UTF-8.
    fn intrinsic_encoding(&self) -> EncodingId {
        EncodingId::utf8()
    }

    /// Whether the stream is connected to an interactive device.
    fn is_interactive(&self) -> bool {
        false
    }

    /// Whether sync mode is on: derived writes flush after every write.
    fn is_sync(&self) -> bool {
        self.core().sync
    }

    /// Turns sync mode on or off.
    fn set_sync(&mut self, sync: bool) {
        self.core_mut().sync = sync;
    }

    /// Configures the external (and optionally internal) encoding and
    /// rebuilds the converter. Returns `self` for chaining.
    ///
    /// [`EncodingSpec::Clear`] restores "no conversion, raw bytes". A
    /// malformed spec fails with `InvalidEncoding` and leaves the state
    /// untouched.
    fn set_encoding(
        &mut self,
        spec: EncodingSpec,
        options: &ConverterOptions,
    ) -> Result<&mut Self> {
        self.core_mut().encoding.apply(spec, options)?;
        Ok(self)
    }

    /// Forces binary mode: external encoding `Binary`, identity converter.
    /// Returns `self` for chaining.
    fn binmode(&mut self) -> &mut Self {
        self.core_mut().encoding.set_binary();
        self
    }

    /// Returns true once [`Stream::binmode`] has been applied.
    fn is_binmode(&self) -> bool {
        self.core().encoding.is_binary_mode()
    }

    /// The effective external encoding: the configured one, or the
    /// backend's intrinsic encoding when unset.
    fn external_encoding(&self) -> EncodingId {
        self.core()
            .encoding
            .external()
            .unwrap_or_else(|| self.intrinsic_encoding())
    }

    /// The configured internal encoding, if any.
    fn internal_encoding(&self) -> Option<EncodingId> {
        self.core().encoding.internal()
    }

    /// Runs raw bytes through the converter, tagging identity output with
    /// the effective external encoding.
    ///
    /// Used by the char and line read paths only; the byte paths never
    /// touch the converter.
    fn convert_bytes(&mut self, bytes: &[u8]) -> Result<Text> {
        let fallback = self.external_encoding();
        self.core_mut().encoding.convert(bytes, fallback)
    }
}
