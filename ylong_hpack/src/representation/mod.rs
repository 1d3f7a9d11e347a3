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

//! [Header Field Representation] of [HPACK].
//!
//! [Header Field Representation]: https://www.rfc-editor.org/rfc/rfc7541.html#section-2.4
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//!
//! # Description
//! An encoded header field can be represented either as an index or as a
//! literal.
//!
//! An indexed representation refers to an entry in the static table or the
//! dynamic table. Referring to a dynamic table entry toggles its membership
//! in the reference set.
//!
//! A literal representation defines a header field by specifying its name
//! and value. The name can be represented literally or as a reference to an
//! entry in either the static table or the dynamic table. The value is
//! always represented literally, either directly or with the static Huffman
//! code.
//!
//! An encoding context update changes the decoding context without producing
//! a header field: it either empties the reference set or changes the maximum
//! size of the dynamic table.

mod decoder;

pub(crate) use decoder::ReprDecoder;

/// Definition and binary format of each of the different header field
/// representations and of the encoding context updates.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Representation {
    /// An indexed header field representation identifies an entry in either
    /// the static table or the dynamic table.
    ///
    /// # Binary Format
    /// `Indexed Header Field`:
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 1 |        Index (7+)         |
    /// +---+---------------------------+
    /// ```
    Indexed { index: usize },

    /// A literal header field with incremental indexing representation
    /// results in appending a header field to the decoded header list and
    /// inserting it as a new entry into the dynamic table.
    ///
    /// # Binary Format
    /// `Literal Header Field with Incremental Indexing -- Indexed Name`:
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 1 |      Index (6+)       |
    /// +---+---+-----------------------+
    /// | H |     Value Length (7+)     |
    /// +---+---------------------------+
    /// | Value String (Length octets)  |
    /// +-------------------------------+
    /// ```
    ///
    /// `Literal Header Field with Incremental Indexing -- New Name`:
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 1 |           0           |
    /// +---+---+-----------------------+
    /// | H |     Name Length (7+)      |
    /// +---+---------------------------+
    /// |  Name String (Length octets)  |
    /// +---+---------------------------+
    /// | H |     Value Length (7+)     |
    /// +---+---------------------------+
    /// | Value String (Length octets)  |
    /// +-------------------------------+
    /// ```
    LiteralWithIndexing { name: Name, value: Vec<u8> },

    /// A literal header field without indexing representation results in
    /// appending a header field to the decoded header list without altering
    /// the dynamic table.
    ///
    /// # Binary Format
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 0 | 0 | 0 |  Index (4+)   |
    /// +---+---+---+---+---------------+
    /// ```
    /// followed by the name string when the index is 0, and by the value
    /// string.
    LiteralWithoutIndexing { name: Name, value: Vec<u8> },

    /// A literal header field never-indexed representation is decoded like
    /// `LiteralWithoutIndexing`. The flag only tells intermediaries to keep
    /// the literal representation when re-encoding.
    ///
    /// # Binary Format
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 0 | 0 | 1 |  Index (4+)   |
    /// +---+---+---+---+---------------+
    /// ```
    LiteralNeverIndexed { name: Name, value: Vec<u8> },

    /// Removes every entry from the reference set.
    ///
    /// # Binary Format
    /// `Reference Set Emptying`:
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 0 | 1 | 1 |       0       |
    /// +---+---+---+---+---------------+
    /// ```
    EmptyReferenceSet,

    /// Signals a change to the maximum size of the dynamic table.
    ///
    /// # Binary Format
    /// `Maximum Header Table Size Change`:
    /// ```text
    ///   0   1   2   3   4   5   6   7
    /// +---+---+---+---+---+---+---+---+
    /// | 0 | 0 | 1 | 0 | Max size (4+) |
    /// +---+---+---+---+---------------+
    /// ```
    SizeUpdate { max_size: usize },
}

/// Prefix bit of `Representation`. An integer is represented in two
/// parts: a prefix that fills the current octet and an optional list of octets
/// that are used if the integer value does not fit within the prefix.
///
/// # Binary Format
/// ```text
///   0   1   2   3   4   5   6   7
/// +---+---+---+---+---+---+---+---+
/// | PrefixBit |       Value       |
/// +---+---+---+-------------------+
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct PrefixBit(u8);

impl PrefixBit {
    pub(crate) const INDEXED: Self = Self(0x80);
    pub(crate) const LITERAL_WITH_INDEXING: Self = Self(0x40);
    pub(crate) const EMPTY_REFERENCE_SET: Self = Self(0x30);
    pub(crate) const SIZE_UPDATE: Self = Self(0x20);
    pub(crate) const LITERAL_NEVER_INDEXED: Self = Self(0x10);
    pub(crate) const LITERAL_WITHOUT_INDEXING: Self = Self(0x00);

    /// Creates a `PrefixBit` from a byte. The interface will convert the
    /// incoming byte to the most suitable prefix bit.
    pub(crate) fn from_u8(byte: u8) -> Self {
        match byte {
            x if x >= 0x80 => Self::INDEXED,
            x if x >= 0x40 => Self::LITERAL_WITH_INDEXING,
            x if x >= 0x30 => Self::EMPTY_REFERENCE_SET,
            x if x >= 0x20 => Self::SIZE_UPDATE,
            x if x >= 0x10 => Self::LITERAL_NEVER_INDEXED,
            _ => Self::LITERAL_WITHOUT_INDEXING,
        }
    }

    /// Returns the corresponding `PrefixIndexMask` according to the current
    /// prefix bit.
    pub(crate) fn prefix_index_mask(&self) -> PrefixIndexMask {
        match self.0 {
            0x80 => PrefixIndexMask::INDEXED,
            0x40 => PrefixIndexMask::LITERAL_WITH_INDEXING,
            0x30 => PrefixIndexMask::EMPTY_REFERENCE_SET,
            0x20 => PrefixIndexMask::SIZE_UPDATE,
            0x10 => PrefixIndexMask::LITERAL_NEVER_INDEXED,
            _ => PrefixIndexMask::LITERAL_WITHOUT_INDEXING,
        }
    }
}

/// Prefix index mask of `Representation`.
///
/// # Binary Format
/// ```text
///   0   1   2   3   4   5   6   7
/// +---+---+---+---+---+---+---+---+
/// | PrefixBit |       Value       |
/// +---+---+---+-------------------+
///
/// +---+---+---+---+---+---+---+---+
/// | 0 | 0 | 0 | 1 | 1 | 1 | 1 | 1 |
/// +---+---+---+---+---+---+---+---+
/// |<-      PrefixIndexMask      ->|
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct PrefixIndexMask(pub(crate) u8);

impl PrefixIndexMask {
    pub(crate) const INDEXED: Self = Self(0x7f);
    pub(crate) const LITERAL_WITH_INDEXING: Self = Self(0x3f);
    pub(crate) const EMPTY_REFERENCE_SET: Self = Self(0x0f);
    pub(crate) const SIZE_UPDATE: Self = Self(0x0f);
    pub(crate) const LITERAL_NEVER_INDEXED: Self = Self(0x0f);
    pub(crate) const LITERAL_WITHOUT_INDEXING: Self = Self(0x0f);
}

/// Name of `Representation`. It can be represented as string literals or an
/// index.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Name {
    Index(usize),
    Literal(Vec<u8>),
}

#[cfg(test)]
mod ut_representation {
    use crate::representation::{PrefixBit, PrefixIndexMask};

    /// UT test cases for `PrefixBit::from_u8`.
    ///
    /// # Brief
    /// 1. Converts leading octets of every representation.
    /// 2. Checks the prefix bit and its index mask.
    #[test]
    fn ut_prefix_bit() {
        let cases = [
            (0xbe, PrefixBit::INDEXED, PrefixIndexMask::INDEXED),
            (0x40, PrefixBit::LITERAL_WITH_INDEXING, PrefixIndexMask::LITERAL_WITH_INDEXING),
            (0x30, PrefixBit::EMPTY_REFERENCE_SET, PrefixIndexMask::EMPTY_REFERENCE_SET),
            (0x2f, PrefixBit::SIZE_UPDATE, PrefixIndexMask::SIZE_UPDATE),
            (0x1f, PrefixBit::LITERAL_NEVER_INDEXED, PrefixIndexMask::LITERAL_NEVER_INDEXED),
            (0x04, PrefixBit::LITERAL_WITHOUT_INDEXING, PrefixIndexMask::LITERAL_WITHOUT_INDEXING),
        ];
        for (byte, prefix, mask) in cases {
            assert_eq!(PrefixBit::from_u8(byte), prefix);
            assert_eq!(PrefixBit::from_u8(byte).prefix_index_mask(), mask);
        }
    }
}
