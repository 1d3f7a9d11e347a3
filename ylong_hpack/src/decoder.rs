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
use crate::listener::HeaderListener;
use crate::octets::ReadableBytes;
use crate::reference::{ReferenceSet, Toggle};
use crate::representation::{Name, ReprDecoder, Representation};
use crate::table::{entry_size, HeaderTable, StaticTable, TableEntry};

const DEFAULT_HEADER_TABLE_SIZE: usize = 4096;
const DEFAULT_MAX_HEADER_LIST_SIZE: usize = 16 * 1024;

// Size accounting of the header list of the current header block.
struct HeaderLines {
    header_size: usize,
    max_header_list_size: usize,
    truncated: bool,
}

impl HeaderLines {
    // Passes a header field to the listener if it still fits in the header
    // list. Otherwise marks the block as truncated and drops the field.
    fn emit<L>(&mut self, listener: &mut L, name: &[u8], value: &[u8]) -> bool
    where
        L: HeaderListener + ?Sized,
    {
        let total = self
            .header_size
            .checked_add(entry_size(name.len(), value.len()))
            .filter(|total| *total <= self.max_header_list_size);
        match total {
            Some(total) => {
                self.header_size = total;
                listener.emit_header(name, value);
                true
            }
            None => {
                tracing::debug!(
                    name_len = name.len(),
                    value_len = value.len(),
                    header_size = self.header_size,
                    max_header_list_size = self.max_header_list_size,
                    "hpack header list truncated"
                );
                self.truncated = true;
                false
            }
        }
    }

    fn reset(&mut self) -> bool {
        self.header_size = 0;
        core::mem::take(&mut self.truncated)
    }
}

/// Decoder implementation of [`HPACK`] with a reference set.
///
/// A decoder holds the compression context of one direction of a
/// connection: the dynamic table, the reference set and the size accounting
/// of the header block being decoded. Header blocks must be fed in the order
/// they appear on the connection.
///
/// `decode` may be called several times per header block, each time with the
/// bytes received so far. A representation that is not complete yet is left
/// in the cursor untouched. `end_header_block` closes the block.
///
/// [`HPACK`]: https://httpwg.org/specs/rfc7541.html
///
/// # Examples
///
/// ```
/// use ylong_hpack::{HpackDecoder, ReadableBytes};
///
/// let mut decoder = HpackDecoder::new(true, 8192);
/// let mut headers: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
///
/// // `:method: GET`, then an incomplete literal.
/// let mut cursor = ReadableBytes::from(&[0x82, 0x40, 0x0a]);
/// decoder.decode(&mut cursor, &mut headers).unwrap();
/// assert_eq!(cursor.index(), 1);
///
/// assert!(!decoder.end_header_block(&mut headers));
/// assert_eq!(headers, vec![(b":method".to_vec(), b"GET".to_vec())]);
/// ```
pub struct HpackDecoder {
    table: HeaderTable,
    refs: ReferenceSet,
    lines: HeaderLines,
    max_header_table_size: usize,
}

impl HpackDecoder {
    /// Creates a `HpackDecoder` for the given side of a connection with the
    /// default header table size of 4096 octets.
    ///
    /// # Examples
    ///
    /// ```
    /// use ylong_hpack::HpackDecoder;
    ///
    /// let decoder = HpackDecoder::new(false, 16 * 1024);
    /// assert_eq!(decoder.max_header_table_size(), 4096);
    /// ```
    pub fn new(server: bool, max_header_list_size: usize) -> Self {
        Self::builder()
            .server(server)
            .max_header_list_size(max_header_list_size)
            .build()
    }

    /// Creates a `DecoderBuilder` with default settings.
    pub fn builder() -> DecoderBuilder {
        DecoderBuilder::new()
    }

    /// Decodes as many complete representations from `src` as possible and
    /// passes the resulting header fields to `listener`.
    ///
    /// On return `src` is positioned at the start of the first representation
    /// that is not complete yet, or at its end. On error `src` is positioned at
    /// the start of the failing representation and the decoding context is
    /// left as it was before that representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use ylong_hpack::{HpackDecoder, ReadableBytes};
    ///
    /// let mut decoder = HpackDecoder::new(true, 8192);
    /// let mut headers: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
    ///
    /// let bytes = [0xff, 0xf0];
    /// let mut cursor = ReadableBytes::from(&bytes);
    /// decoder.decode(&mut cursor, &mut headers).unwrap();
    /// assert_eq!(cursor.cap(), 2);
    /// assert!(headers.is_empty());
    /// ```
    pub fn decode<L>(
        &mut self,
        src: &mut ReadableBytes<'_>,
        listener: &mut L,
    ) -> Result<(), HpackError>
    where
        L: HeaderListener + ?Sized,
    {
        let mut updater = Updater::new(
            &mut self.table,
            &mut self.refs,
            &mut self.lines,
            self.max_header_table_size,
        );
        loop {
            let mark = src.mark();
            let decoded = ReprDecoder::new(src).decode();
            let repr = match decoded {
                Ok(Some(repr)) => repr,
                // The rest of the representation has not arrived yet.
                Ok(None) => return Ok(()),
                Err(e) => return Err(fatal(e, src)),
            };
            if let Err(e) = updater.update(repr, listener) {
                src.rewind(mark);
                return Err(fatal(e, src));
            }
        }
    }

    /// Closes the current header block.
    ///
    /// Every member of the reference set that has not been emitted during
    /// this block is emitted now, oldest first. Returns `true` if any header
    /// field of the block was dropped because the header list grew beyond the
    /// maximum header list size. The size accounting starts over for the next
    /// block.
    ///
    /// # Examples
    ///
    /// ```
    /// use ylong_hpack::{HpackDecoder, ReadableBytes};
    ///
    /// let mut decoder = HpackDecoder::new(true, 8192);
    /// let mut headers: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
    ///
    /// // `custom-key: custom-header`, added to the dynamic table.
    /// let block = [
    ///     0x40, 0x0a, b'c', b'u', b's', b't', b'o', b'm', b'-', b'k', b'e', b'y', 0x0d, b'c',
    ///     b'u', b's', b't', b'o', b'm', b'-', b'h', b'e', b'a', b'd', b'e', b'r',
    /// ];
    /// decoder.decode(&mut ReadableBytes::from(&block), &mut headers).unwrap();
    /// assert!(!decoder.end_header_block(&mut headers));
    /// assert_eq!(headers.len(), 1);
    ///
    /// // An empty block repeats the field from the reference set.
    /// assert!(!decoder.end_header_block(&mut headers));
    /// assert_eq!(headers.len(), 2);
    /// assert_eq!(headers[0], headers[1]);
    /// ```
    pub fn end_header_block<L>(&mut self, listener: &mut L) -> bool
    where
        L: HeaderListener + ?Sized,
    {
        let dynamic = self.table.dynamic();
        for id in self.refs.unemitted() {
            if let Some(entry) = dynamic.get(id) {
                self.lines.emit(listener, entry.name(), entry.value());
            }
        }
        self.refs.end_block();
        self.lines.reset()
    }

    /// Sets both the ceiling for table size changes and the current maximum
    /// size of the dynamic table. Entries that no longer fit are evicted.
    pub fn set_max_header_table_size(&mut self, size: usize) {
        self.max_header_table_size = size;
        let refs = &mut self.refs;
        self.table
            .dynamic_mut()
            .update_size(size, |id| refs.on_evict(id));
    }

    /// Gets the ceiling for table size changes.
    pub fn max_header_table_size(&self) -> usize {
        self.max_header_table_size
    }

    /// Sets the maximum size of a decoded header list. Takes effect from the
    /// next emitted header field on.
    pub fn set_max_header_list_size(&mut self, size: usize) {
        self.lines.max_header_list_size = size;
    }

    /// Gets the maximum size of a decoded header list.
    pub fn max_header_list_size(&self) -> usize {
        self.lines.max_header_list_size
    }

    /// Gets the current maximum size of the dynamic table, as last changed
    /// by the encoder.
    pub fn header_table_size(&self) -> usize {
        self.table.dynamic().max_size()
    }

    /// Number of entries in the dynamic table.
    pub fn table_len(&self) -> usize {
        self.table.dynamic().len()
    }

    /// Size of the dynamic table in octets, 32 octets of overhead per entry
    /// included.
    pub fn table_size(&self) -> usize {
        self.table.dynamic().curr_size()
    }

    /// Size of the header list emitted so far in the current header block.
    pub fn header_list_size(&self) -> usize {
        self.lines.header_size
    }

    /// Returns `true` if a header field of the current header block has been
    /// dropped already.
    pub fn is_truncated(&self) -> bool {
        self.lines.truncated
    }
}

impl Default for HpackDecoder {
    fn default() -> Self {
        DecoderBuilder::new().build()
    }
}

fn fatal(e: HpackError, src: &ReadableBytes<'_>) -> HpackError {
    tracing::warn!(kind = ?e.kind(), offset = src.index(), "hpack decoding failed");
    e
}

/// `Updater` applies decoded representations to the decoding context.
struct Updater<'a> {
    table: &'a mut HeaderTable,
    refs: &'a mut ReferenceSet,
    lines: &'a mut HeaderLines,
    max_header_table_size: usize,
}

impl<'a> Updater<'a> {
    fn new(
        table: &'a mut HeaderTable,
        refs: &'a mut ReferenceSet,
        lines: &'a mut HeaderLines,
        max_header_table_size: usize,
    ) -> Self {
        Self {
            table,
            refs,
            lines,
            max_header_table_size,
        }
    }

    // Fails only before any part of the context has changed.
    fn update<L>(&mut self, repr: Representation, listener: &mut L) -> Result<(), HpackError>
    where
        L: HeaderListener + ?Sized,
    {
        match repr {
            Representation::Indexed { index } => self.update_indexed(index, listener),
            Representation::LiteralWithIndexing { name, value } => {
                self.update_literal_with_indexing(name, value, listener)
            }
            Representation::LiteralWithoutIndexing { name, value }
            | Representation::LiteralNeverIndexed { name, value } => {
                self.update_literal_without_indexing(name, value, listener)
            }
            Representation::EmptyReferenceSet => {
                tracing::trace!(members = self.refs.len(), "hpack reference set emptied");
                self.refs.clear();
                Ok(())
            }
            Representation::SizeUpdate { max_size } => self.update_size(max_size),
        }
    }

    fn update_indexed<L>(&mut self, index: usize, listener: &mut L) -> Result<(), HpackError>
    where
        L: HeaderListener + ?Sized,
    {
        match self.table.lookup(index)? {
            // Static entries never join the reference set.
            TableEntry::Static { name, value } => {
                self.lines.emit(listener, name, value);
            }
            TableEntry::Dynamic(entry) => match self.refs.toggle(entry.id()) {
                Toggle::Added => {
                    self.lines.emit(listener, entry.name(), entry.value());
                }
                Toggle::Removed => {}
            },
        }
        Ok(())
    }

    fn update_literal_with_indexing<L>(
        &mut self,
        name: Name,
        value: Vec<u8>,
        listener: &mut L,
    ) -> Result<(), HpackError>
    where
        L: HeaderListener + ?Sized,
    {
        let name = self.resolve_name(name)?;
        // A field that does not fit in the header list leaves the table alone.
        if !self.lines.emit(listener, &name, &value) {
            return Ok(());
        }
        let refs = &mut *self.refs;
        let id = self
            .table
            .dynamic_mut()
            .update(name, value, |id| refs.on_evict(id));
        if let Some(id) = id {
            self.refs.insert_emitted(id);
        }
        Ok(())
    }

    fn update_literal_without_indexing<L>(
        &mut self,
        name: Name,
        value: Vec<u8>,
        listener: &mut L,
    ) -> Result<(), HpackError>
    where
        L: HeaderListener + ?Sized,
    {
        let name = self.resolve_name(name)?;
        self.lines.emit(listener, &name, &value);
        Ok(())
    }

    fn update_size(&mut self, max_size: usize) -> Result<(), HpackError> {
        if max_size > self.max_header_table_size {
            return Err(ErrorKind::InvalidTableSizeUpdate(max_size).into());
        }
        tracing::trace!(max_size, "hpack header table size changed");
        let refs = &mut *self.refs;
        self.table
            .dynamic_mut()
            .update_size(max_size, |id| refs.on_evict(id));
        Ok(())
    }

    fn resolve_name(&self, name: Name) -> Result<Vec<u8>, HpackError> {
        match name {
            Name::Index(index) => Ok(self.table.lookup(index)?.name().to_vec()),
            Name::Literal(octets) => Ok(octets),
        }
    }
}

/// Builder of [`HpackDecoder`].
///
/// # Examples
///
/// ```
/// use ylong_hpack::DecoderBuilder;
///
/// let decoder = DecoderBuilder::new()
///     .server(true)
///     .max_header_list_size(8192)
///     .max_header_table_size(256)
///     .build();
/// assert_eq!(decoder.max_header_table_size(), 256);
/// assert_eq!(decoder.max_header_list_size(), 8192);
/// ```
pub struct DecoderBuilder {
    server: bool,
    max_header_list_size: usize,
    max_header_table_size: usize,
}

impl DecoderBuilder {
    /// Creates a `DecoderBuilder` for a client with a header table of 4096
    /// octets and a header list limit of 16 KiB.
    pub fn new() -> Self {
        Self {
            server: false,
            max_header_list_size: DEFAULT_MAX_HEADER_LIST_SIZE,
            max_header_table_size: DEFAULT_HEADER_TABLE_SIZE,
        }
    }

    /// Selects the side of the connection the decoder works for.
    pub fn server(mut self, server: bool) -> Self {
        self.server = server;
        self
    }

    /// Sets the maximum size of a decoded header list.
    pub fn max_header_list_size(mut self, size: usize) -> Self {
        self.max_header_list_size = size;
        self
    }

    /// Sets the maximum size of the dynamic table and the ceiling for table
    /// size changes.
    pub fn max_header_table_size(mut self, size: usize) -> Self {
        self.max_header_table_size = size;
        self
    }

    /// Builds the `HpackDecoder`.
    pub fn build(self) -> HpackDecoder {
        HpackDecoder {
            table: HeaderTable::new(
                StaticTable::for_role(self.server),
                self.max_header_table_size,
            ),
            refs: ReferenceSet::new(),
            lines: HeaderLines {
                header_size: 0,
                max_header_list_size: self.max_header_list_size,
                truncated: false,
            },
            max_header_table_size: self.max_header_table_size,
        }
    }
}

impl Default for DecoderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
