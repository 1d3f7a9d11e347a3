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

//! [Integer Representation] decoding.
//!
//! [Integer Representation]: https://httpwg.org/specs/rfc7541.html#integer.representation
//!
//! # Introduction
//! Integers are used to represent name indexes, header field indexes, or
//! string lengths. An integer representation can start anywhere within an
//! octet. To allow for optimized processing, an integer representation always
//! finishes at the end of an octet.
//!
//! Decoded integers are limited to 31 bits. A peer can send an endless run of
//! `0x80` continuation octets, so the decoder refuses both values past
//! `i32::MAX` and continuations past the fifth octet.

use core::cmp::Ordering;

use crate::error::{ErrorKind, HpackError};
use crate::octets::ReadableBytes;

/// The largest integer the decoder accepts.
const MAX_INTEGER: u64 = i32::MAX as u64;

/// The largest shift a continuation octet may carry. Five continuation octets
/// hold 35 bits, which is more than `MAX_INTEGER` needs.
const MAX_SHIFT: u32 = 28;

/// `IntegerDecoder` implementation according to `Pseudocode to decode an
/// integer I` in `RFC7541 section-5.1`.
///
/// # Pseudocode
/// ```text
/// decode I from the next N bits
/// if I < 2^N - 1, return I
/// else
///     M = 0
///     repeat
///         B = next octet
///         I = I + (B & 127) * 2^M
///         M = M + 7
///     while B & 128 == 128
///     return I
/// ```
pub(crate) struct IntegerDecoder {
    index: u64,
    shift: u32,
}

impl IntegerDecoder {
    /// Calculates an integer based on the incoming first byte and mask.
    /// If no subsequent bytes exist, return the result directly, otherwise
    /// return the decoder itself.
    pub(crate) fn first_byte(byte: u8, mask: u8) -> Result<usize, Self> {
        let index = byte & mask;
        match index.cmp(&mask) {
            Ordering::Less => Ok(index as usize),
            _ => Err(Self {
                index: index as u64,
                shift: 0,
            }),
        }
    }

    /// Continues computing the integer based on the next byte of the input.
    /// Returns `Ok(Some(index))` if the result is obtained, otherwise returns
    /// `Ok(None)`, and returns Err in case of overflow.
    pub(crate) fn next_byte(&mut self, byte: u8) -> Result<Option<usize>, HpackError> {
        if self.shift > MAX_SHIFT {
            return Err(ErrorKind::IntegerOverflow.into());
        }
        self.index += ((byte & 0x7f) as u64) << self.shift;
        if self.index > MAX_INTEGER {
            return Err(ErrorKind::IntegerOverflow.into());
        }
        self.shift += 7;
        match (byte & 0x80) == 0x00 {
            true => Ok(Some(self.index as usize)),
            false => Ok(None),
        }
    }

    /// Feeds the trailing octets from `buf` until the integer is complete.
    /// Returns `Ok(None)` if `buf` runs out first; the consumed octets are
    /// then the caller's to rewind.
    pub(crate) fn trailing_bytes(
        mut self,
        buf: &mut ReadableBytes<'_>,
    ) -> Result<Option<usize>, HpackError> {
        while let Some(byte) = buf.poll_u8() {
            if let Some(index) = self.next_byte(byte)? {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }
}

/// Decodes an integer whose prefix occupies the bits of `mask` in the first
/// octet of `buf`.
pub(crate) fn decode_integer(
    buf: &mut ReadableBytes<'_>,
    mask: u8,
) -> Result<Option<usize>, HpackError> {
    let byte = match buf.poll_u8() {
        Some(byte) => byte,
        None => return Ok(None),
    };
    match IntegerDecoder::first_byte(byte, mask) {
        Ok(index) => Ok(Some(index)),
        Err(int) => int.trailing_bytes(buf),
    }
}
