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

//! `ylong_hpack` decodes header blocks compressed with [`HPACK`] in its
//! reference set form.
//!
//! A [`HpackDecoder`] keeps the decoding context of one direction of a
//! connection: a dynamic table of recently seen header fields, and a
//! reference set of dynamic table entries that are repeated implicitly in
//! every header block until the encoder toggles them off. Decoded header
//! fields are passed to a [`HeaderListener`].
//!
//! Input is read through a [`ReadableBytes`] cursor. A representation that
//! has not arrived completely is left unread, so the caller can append more
//! bytes and call [`HpackDecoder::decode`] again.
//!
//! # Features
//! - `huffman`: decoding of Huffman-coded string literals. Enabled by
//! default. Without it a Huffman-coded literal is a decoding error.
//!
//! [`HPACK`]: https://httpwg.org/specs/rfc7541.html
//!
//! # Examples
//!
//! ```
//! use ylong_hpack::{HpackDecoder, ReadableBytes};
//!
//! let mut decoder = HpackDecoder::builder()
//!     .server(true)
//!     .max_header_list_size(8192)
//!     .build();
//! let mut headers: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
//!
//! let block = [0x82, 0x86, 0x84];
//! let mut cursor = ReadableBytes::from(&block);
//! decoder.decode(&mut cursor, &mut headers).unwrap();
//! let truncated = decoder.end_header_block(&mut headers);
//!
//! assert!(!truncated);
//! assert_eq!(headers[1], (b":scheme".to_vec(), b"http".to_vec()));
//! ```

mod decoder;
mod error;
#[cfg(feature = "huffman")]
mod huffman;
mod integer;
mod listener;
mod octets;
mod reference;
mod representation;
mod table;

pub(crate) mod util;

pub use decoder::{DecoderBuilder, HpackDecoder};
pub use error::{ErrorKind, HpackError};
pub use listener::HeaderListener;
pub use octets::{Mark, ReadableBytes};
