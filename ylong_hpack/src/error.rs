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

//! Errors that may occur in this crate.
//!
//! [`HpackError`] is the only error `HpackDecoder` returns. Every variant is
//! fatal for the connection: it means that the stream is corrupt or that the
//! compression contexts of the two endpoints have diverged.
//!
//! Running out of input is not an error. `HpackDecoder::decode` returns
//! `Ok(())` and leaves the unfinished bytes in the cursor.
//!
//! [`HpackError`]: HpackError

use core::fmt::{Debug, Display, Formatter};
use std::error::Error;

/// Errors that may occur when decoding a header block.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub struct HpackError {
    kind: ErrorKind,
}

impl HpackError {
    /// Gets the `ErrorKind` of this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use ylong_hpack::{ErrorKind, HpackDecoder, ReadableBytes};
    ///
    /// let mut decoder = HpackDecoder::new(true, 8192);
    /// let mut headers: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
    /// let mut cursor = ReadableBytes::from(&[0x80]);
    /// let err = decoder.decode(&mut cursor, &mut headers).unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::IllegalIndex(0));
    /// ```
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<ErrorKind> for HpackError {
    fn from(kind: ErrorKind) -> Self {
        HpackError { kind }
    }
}

impl Display for HpackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl Error for HpackError {}

/// The reason a header block could not be decoded.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum ErrorKind {
    /// An index of 0, or an index past the end of the static and dynamic
    /// tables.
    IllegalIndex(usize),

    /// An integer representation does not fit in 31 bits.
    IntegerOverflow,

    /// A Huffman-coded string contains an invalid code, the EOS symbol, or
    /// invalid padding.
    InvalidHuffmanCode,

    /// A literal header field carries a zero-length name.
    EmptyHeaderName,

    /// A maximum header table size change exceeds the allowed ceiling.
    InvalidTableSizeUpdate(usize),

    /// An encoding context update with unknown flag bits.
    InvalidContextUpdate(u8),
}

#[cfg(test)]
mod ut_error {
    use crate::error::{ErrorKind, HpackError};

    /// UT test cases for `HpackError`.
    ///
    /// # Brief
    /// 1. Creates `HpackError`s from `ErrorKind`s.
    /// 2. Checks the kind and the formatted output.
    #[test]
    fn ut_hpack_error() {
        let err = HpackError::from(ErrorKind::IllegalIndex(127));
        assert_eq!(err.kind(), ErrorKind::IllegalIndex(127));
        assert_eq!(
            format!("{err}"),
            "HpackError { kind: IllegalIndex(127) }"
        );

        let err: HpackError = ErrorKind::IntegerOverflow.into();
        assert_eq!(format!("{err:?}"), "HpackError { kind: IntegerOverflow }");
    }
}
