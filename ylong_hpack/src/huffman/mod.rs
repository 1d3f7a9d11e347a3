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

//! [Huffman coding] of string literals in HPACK.
//!
//! [Huffman Coding]: https://en.wikipedia.org/wiki/Huffman_coding
//!
//! # Huffman code in HPACK
//! There is a table of Huffman code in `RFC7541`. This [Huffman code] was
//! generated from statistics obtained on a large sample of HTTP headers. It is
//! a canonical Huffman code with some tweaking to ensure that no symbol has a
//! unique code length.
//!
//! A string literal whose `H` bit is set is decoded here. The last octet is
//! padded with the most significant bits of the EOS code, so up to 7 trailing
//! `1` bits are not part of any symbol.
//!
//! [Huffman Code]: https://www.rfc-editor.org/rfc/rfc7541.html#ref-HUFFMAN

mod consts;

use consts::{EOS, HUFFMAN_DECODE, LEAF};

/// Converts a Huffman code into a literal string at one time, and then put it
/// into the specified `Vec<u8>`.
pub(crate) fn huffman_decode(src: &[u8], dst: &mut Vec<u8>) -> Result<(), HuffmanDecodeError> {
    let mut decoder = HuffmanDecoder::new();
    decoder.decode(src)?;
    dst.extend_from_slice(&decoder.finish()?);
    Ok(())
}

/// Converts a Huffman code into a literal string, and then put it into the
/// specified `Vec<u8>`. Users can split the string into multiple slices and
/// then pass them into `HuffmanDecoder` to get the result.
pub(crate) struct HuffmanDecoder {
    // Current node of `HUFFMAN_DECODE`.
    node: usize,
    // Bits walked since the last decoded symbol.
    depth: u8,
    // Whether all of those bits were `1`.
    ones: bool,
    vec: Vec<u8>,
}

impl HuffmanDecoder {
    /// Creates a new, empty `HuffmanDecoder`.
    pub(crate) fn new() -> Self {
        Self {
            node: 0,
            depth: 0,
            ones: true,
            vec: Vec::new(),
        }
    }

    /// Decodes input string. Stop when the `src` is used up.
    pub(crate) fn decode(&mut self, src: &[u8]) -> Result<(), HuffmanDecodeError> {
        for byte in src.iter() {
            for shift in (0..8).rev() {
                let bit = (byte >> shift) & 0x1;
                let child = HUFFMAN_DECODE[self.node][bit as usize];
                if child & LEAF == LEAF {
                    let sym = child & !LEAF;
                    // RFC7541-5.2: A Huffman-encoded string literal containing
                    // the EOS symbol MUST be treated as a decoding error.
                    if sym == EOS {
                        return Err(HuffmanDecodeError::InvalidHuffmanCode);
                    }
                    self.vec.push(sym as u8);
                    self.node = 0;
                    self.depth = 0;
                    self.ones = true;
                } else {
                    self.node = child as usize;
                    self.depth += 1;
                    self.ones &= bit == 1;
                }
            }
        }
        Ok(())
    }

    /// Finishes decoding and get the decoded result.
    pub(crate) fn finish(self) -> Result<Vec<u8>, HuffmanDecodeError> {
        // RFC7541-5.2: Padding strictly longer than 7 bits, or padding not
        // corresponding to the most significant bits of EOS, MUST be treated
        // as a decoding error.
        if self.depth > 7 || !self.ones {
            return Err(HuffmanDecodeError::InvalidHuffmanCode);
        }
        Ok(self.vec)
    }
}

/// Possible errors in Huffman decoding operations.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum HuffmanDecodeError {
    InvalidHuffmanCode,
}
