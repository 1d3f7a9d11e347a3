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

use crate::error::{ErrorKind, HpackError};
#[cfg(feature = "huffman")]
use crate::huffman::huffman_decode;
use crate::integer::decode_integer;
use crate::octets::ReadableBytes;
use crate::representation::{Name, PrefixBit, Representation};

// Unwraps a `Result<Option<T>, HpackError>`, returning early on `Err` and on
// `Ok(None)`.
macro_rules! ready {
    ($e: expr) => {
        match $e? {
            Some(v) => v,
            None => return Ok(None),
        }
    };
}

/// Decoder implementation for decoding representation. Every time users call
/// `decode`, the `ReprDecoder` will try to decode a whole `Representation`.
/// If `buf` ends before the representation does, or if the representation is
/// malformed, `buf` is rewound to where the representation starts.
pub(crate) struct ReprDecoder<'a, 'b> {
    buf: &'b mut ReadableBytes<'a>,
}

impl<'a, 'b> ReprDecoder<'a, 'b> {
    pub(crate) fn new(buf: &'b mut ReadableBytes<'a>) -> Self {
        Self { buf }
    }

    /// Decodes the next `Representation`. Returns `Ok(None)` when `buf`
    /// does not hold a complete one.
    pub(crate) fn decode(&mut self) -> Result<Option<Representation>, HpackError> {
        let mark = self.buf.mark();
        let res = self.decode_representation();
        if !matches!(res, Ok(Some(_))) {
            self.buf.rewind(mark);
        }
        res
    }

    fn decode_representation(&mut self) -> Result<Option<Representation>, HpackError> {
        let byte = match self.buf.peek_u8() {
            Some(byte) => byte,
            None => return Ok(None),
        };
        let repr = PrefixBit::from_u8(byte);
        match repr {
            PrefixBit::EMPTY_REFERENCE_SET => {
                self.buf.poll_u8();
                if byte & repr.prefix_index_mask().0 != 0 {
                    return Err(ErrorKind::InvalidContextUpdate(byte).into());
                }
                return Ok(Some(Representation::EmptyReferenceSet));
            }
            PrefixBit::SIZE_UPDATE => {
                let max_size = ready!(decode_integer(self.buf, repr.prefix_index_mask().0));
                return Ok(Some(Representation::SizeUpdate { max_size }));
            }
            _ => {}
        }

        let index = ready!(decode_integer(self.buf, repr.prefix_index_mask().0));
        if repr == PrefixBit::INDEXED {
            // The index value of 0 is not used. It MUST be treated as a
            // decoding error if found in an indexed header field
            // representation.
            if index == 0 {
                return Err(ErrorKind::IllegalIndex(0).into());
            }
            return Ok(Some(Representation::Indexed { index }));
        }

        let name = match index {
            0 => {
                let octets = ready!(decode_string(self.buf));
                if octets.is_empty() {
                    return Err(ErrorKind::EmptyHeaderName.into());
                }
                Name::Literal(octets)
            }
            index => Name::Index(index),
        };
        let value = ready!(decode_string(self.buf));
        Ok(Some(match repr {
            PrefixBit::LITERAL_WITH_INDEXING => {
                Representation::LiteralWithIndexing { name, value }
            }
            PrefixBit::LITERAL_NEVER_INDEXED => {
                Representation::LiteralNeverIndexed { name, value }
            }
            _ => Representation::LiteralWithoutIndexing { name, value },
        }))
    }
}

/// Decodes a [String Literal Representation].
///
/// [String Literal Representation]: https://www.rfc-editor.org/rfc/rfc7541.html#section-5.2
///
/// # Binary Format
/// ```text
///   0   1   2   3   4   5   6   7
/// +---+---+---+---+---+---+---+---+
/// | H |    String Length (7+)     |
/// +---+---------------------------+
/// |  String Data (Length octets)  |
/// +-------------------------------+
/// ```
fn decode_string(buf: &mut ReadableBytes<'_>) -> Result<Option<Vec<u8>>, HpackError> {
    let is_huffman = match buf.peek_u8() {
        Some(byte) => byte & 0x80 == 0x80,
        None => return Ok(None),
    };
    let length = ready!(decode_integer(buf, 0x7f));
    let octets = match buf.slice(length) {
        Some(octets) => octets,
        None => return Ok(None),
    };
    match is_huffman {
        true => decode_huffman(octets).map(Some),
        false => Ok(Some(octets.to_vec())),
    }
}

#[cfg(feature = "huffman")]
fn decode_huffman(octets: &[u8]) -> Result<Vec<u8>, HpackError> {
    let mut vec = Vec::with_capacity(huffman_capacity(octets.len()));
    huffman_decode(octets, &mut vec)
        .map_err(|_| HpackError::from(ErrorKind::InvalidHuffmanCode))?;
    Ok(vec)
}

// The shortest Huffman code is 5 bits long.
#[cfg(feature = "huffman")]
fn huffman_capacity(len: usize) -> usize {
    len.saturating_mul(8) / 5
}

#[cfg(not(feature = "huffman"))]
fn decode_huffman(_octets: &[u8]) -> Result<Vec<u8>, HpackError> {
    Err(ErrorKind::InvalidHuffmanCode.into())
}
