// Copyright (c) 2023 Huawei Device Co., Ltd.
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Byte cursor over a received header block fragment.
//!
//! A representation is either decoded as a whole or not at all. The decoder
//! takes a [`Mark`] before every representation and rewinds to it when the
//! fragment ends in the middle, so the caller can retry once more bytes are
//! available.

/// A position inside a `ReadableBytes`, taken by `ReadableBytes::mark`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark(usize);

/// A peekable, rewindable view over a borrowed byte sequence.
///
/// # Examples
///
/// ```
/// use ylong_hpack::ReadableBytes;
///
/// let mut bytes = ReadableBytes::from(&[0x82, 0x86]);
/// let mark = bytes.mark();
/// assert_eq!(bytes.poll_u8(), Some(0x82));
/// assert_eq!(bytes.cap(), 1);
/// bytes.rewind(mark);
/// assert_eq!(bytes.cap(), 2);
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct ReadableBytes<'a> {
    buf: &'a [u8],
    idx: usize,
}

impl<'a> ReadableBytes<'a> {
    /// Creates a `ReadableBytes` positioned at the start of `buf`.
    pub fn from(buf: &'a [u8]) -> Self {
        ReadableBytes { buf, idx: 0 }
    }

    /// Returns the next byte without consuming it.
    pub fn peek_u8(&self) -> Option<u8> {
        self.buf.get(self.idx).copied()
    }

    /// Consumes and returns the next byte.
    pub fn poll_u8(&mut self) -> Option<u8> {
        let byte = self.peek_u8()?;
        self.idx += 1;
        Some(byte)
    }

    /// Consumes exactly `length` bytes. Returns `None` and consumes nothing
    /// if fewer bytes are available.
    pub fn slice(&mut self, length: usize) -> Option<&'a [u8]> {
        if self.cap() < length {
            return None;
        }
        let curr = self.idx;
        self.idx += length;
        Some(&self.buf[curr..self.idx])
    }

    /// Remembers the current position.
    pub fn mark(&self) -> Mark {
        Mark(self.idx)
    }

    /// Moves back to a position remembered by `mark`.
    pub fn rewind(&mut self, mark: Mark) {
        self.idx = mark.0.min(self.buf.len());
    }

    /// Returns the number of bytes not consumed yet.
    pub fn cap(&self) -> usize {
        self.buf.len() - self.idx
    }

    /// Returns the number of bytes consumed so far.
    pub fn index(&self) -> usize {
        self.idx
    }

    /// Returns the bytes not consumed yet.
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.idx..]
    }
}
