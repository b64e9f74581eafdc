//! Encoding-tagged byte strings.
//!
//! [`Text`] is the output type of the encoding converter: a byte buffer
//! carrying the [`EncodingId`] it is meant to be interpreted under. Identity
//! conversion produces `Text` by tagging raw bytes without transcoding, so
//! the tag is metadata, not a validity guarantee.

use crate::encoding::EncodingId;
use std::borrow::Cow;
use std::fmt;

/// A byte string tagged with the encoding it should be interpreted under.
#[derive(Clone, PartialEq, Eq)]
pub struct Text {
    bytes: Vec<u8>,
    encoding: EncodingId,
}

impl Text {
    /// Creates a `Text` from raw bytes and an encoding tag.
    #[must_use]
    pub const fn new(bytes: Vec<u8>, encoding: EncodingId) -> Self {
        Self { bytes, encoding }
    }

    /// Creates an empty `Text` with the given encoding tag.
    #[must_use]
    pub const fn empty(encoding: EncodingId) -> Self {
        Self {
            bytes: Vec::new(),
            encoding,
        }
    }

    /// The raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the `Text`, returning the raw bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// The encoding tag.
    #[must_use]
    pub const fn encoding(&self) -> EncodingId {
        self.encoding
    }

    /// Byte length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if there are no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Replaces the contents in place, keeping this `Text`'s own encoding
    /// tag. Used by the in-place read variants.
    pub fn replace_bytes(&mut self, bytes: Vec<u8>) {
        self.bytes = bytes;
    }

    /// Borrows the contents as `&str` if they are valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    /// Lossy UTF-8 view of the contents, for display and diagnostics.
    #[must_use]
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Text({:?}, {})", self.to_string_lossy(), self.encoding)
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl PartialEq<[u8]> for Text {
    fn eq(&self, other: &[u8]) -> bool {
        self.bytes == other
    }
}

impl PartialEq<&[u8]> for Text {
    fn eq(&self, other: &&[u8]) -> bool {
        self.bytes == *other
    }
}

impl PartialEq<str> for Text {
    fn eq(&self, other: &str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl PartialEq<&str> for Text {
    fn eq(&self, other: &&str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl AsRef<[u8]> for Text {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_test(name: &str) {
        crate::test_utils::init_test_logging();
        crate::test_phase!(name);
    }

    #[test]
    fn tagged_bytes_roundtrip() {
        init_test("tagged_bytes_roundtrip");
        let t = Text::new(b"abc".to_vec(), EncodingId::utf8());
        crate::assert_with_log!(t == "abc", "str compare", "abc", t.to_string_lossy());
        crate::assert_with_log!(t.len() == 3, "len", 3, t.len());
        let enc = t.encoding();
        crate::assert_with_log!(enc == EncodingId::utf8(), "tag", EncodingId::utf8(), enc);
        crate::test_complete!("tagged_bytes_roundtrip");
    }

    #[test]
    fn replace_keeps_tag() {
        init_test("replace_keeps_tag");
        let mut t = Text::new(b"old".to_vec(), EncodingId::Binary);
        t.replace_bytes(b"new".to_vec());
        crate::assert_with_log!(t == "new", "bytes replaced", "new", t.to_string_lossy());
        let enc = t.encoding();
        crate::assert_with_log!(enc == EncodingId::Binary, "tag kept", EncodingId::Binary, enc);
        crate::test_complete!("replace_keeps_tag");
    }
}
