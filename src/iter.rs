//! Lazy iterators over bytes, decoded characters, and decoded lines.
//!
//! Each iterator borrows the stream mutably and pulls through the derived
//! read operations, so close-state gating and encoding conversion apply on
//! every step. The sequences are finite when the backend reports end of
//! stream; they are not inherently restartable.

use crate::error::Result;
use crate::read::{LineParams, Readable};
use crate::text::Text;

/// Iterator over raw byte values. Created by [`Readable::bytes`].
#[derive(Debug)]
pub struct Bytes<'a, S> {
    stream: &'a mut S,
}

impl<'a, S: Readable> Bytes<'a, S> {
    pub(crate) fn new(stream: &'a mut S) -> Self {
        Self { stream }
    }
}

impl<S: Readable> Iterator for Bytes<'_, S> {
    type Item = Result<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        self.stream.get_byte().transpose()
    }
}

/// Iterator over decoded characters. Created by [`Readable::chars`].
#[derive(Debug)]
pub struct Chars<'a, S> {
    stream: &'a mut S,
}

impl<'a, S: Readable> Chars<'a, S> {
    pub(crate) fn new(stream: &'a mut S) -> Self {
        Self { stream }
    }
}

impl<S: Readable> Iterator for Chars<'_, S> {
    type Item = Result<Text>;

    fn next(&mut self) -> Option<Self::Item> {
        self.stream.get_char().transpose()
    }
}

/// Iterator over decoded lines. Created by [`Readable::lines`].
#[derive(Debug)]
pub struct Lines<'a, S> {
    stream: &'a mut S,
    params: LineParams,
}

impl<'a, S: Readable> Lines<'a, S> {
    pub(crate) fn new(stream: &'a mut S, params: LineParams) -> Self {
        Self { stream, params }
    }
}

impl<S: Readable> Iterator for Lines<'_, S> {
    type Item = Result<Text>;

    fn next(&mut self) -> Option<Self::Item> {
        self.stream.gets(self.params.clone()).transpose()
    }
}
