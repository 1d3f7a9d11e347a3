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

//! The static and dynamic tables of [HPACK], addressed through one index
//! space.
//!
//! [HPACK]: https://httpwg.org/specs/rfc7541.html
//!
//! # Index Address Space
//! ```text
//! <----------  Index Address Space ---------->
//! <-- Static  Table -->  <-- Dynamic Table -->
//! +---+-----------+---+  +---+-----------+---+
//! | 1 |    ...    | s |  |s+1|    ...    |s+k|
//! +---+-----------+---+  +---+-----------+---+
//!                        ^                   |
//!                        |                   V
//!                 Insertion Point      Dropping Point
//! ```
//!
//! Dynamic indices shift on every insertion and eviction, so anything that
//! must outlive one representation holds an [`EntryId`] instead.

use std::collections::VecDeque;

use crate::error::{ErrorKind, HpackError};

/// RFC7541-4.1: The additional 32 octets account for an estimated overhead
/// associated with an entry.
pub(crate) const ENTRY_OVERHEAD: usize = 32;

/// The size of a header field as counted by the dynamic table and by the
/// header list budget.
pub(crate) fn entry_size(name_len: usize, value_len: usize) -> usize {
    name_len + value_len + ENTRY_OVERHEAD
}

/// Identity of a dynamic table entry. Identities are handed out in insertion
/// order and are never reused, so they stay valid across index shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct EntryId(u64);

/// An entry of the dynamic table.
pub(crate) struct Entry {
    id: EntryId,
    name: Vec<u8>,
    value: Vec<u8>,
}

impl Entry {
    pub(crate) fn id(&self) -> EntryId {
        self.id
    }

    pub(crate) fn name(&self) -> &[u8] {
        &self.name
    }

    pub(crate) fn value(&self) -> &[u8] {
        &self.value
    }

    pub(crate) fn size(&self) -> usize {
        entry_size(self.name.len(), self.value.len())
    }
}

/// A header field resolved by `HeaderTable::lookup`.
pub(crate) enum TableEntry<'a> {
    Static {
        name: &'static [u8],
        value: &'static [u8],
    },
    Dynamic(&'a Entry),
}

impl TableEntry<'_> {
    pub(crate) fn name(&self) -> &[u8] {
        match self {
            TableEntry::Static { name, .. } => name,
            TableEntry::Dynamic(entry) => entry.name(),
        }
    }

    #[cfg(test)]
    pub(crate) fn value(&self) -> &[u8] {
        match self {
            TableEntry::Static { value, .. } => value,
            TableEntry::Dynamic(entry) => entry.value(),
        }
    }
}

/// The static table followed by the dynamic table.
pub(crate) struct HeaderTable {
    statics: StaticTable,
    dynamic: DynamicTable,
}

impl HeaderTable {
    pub(crate) fn new(statics: StaticTable, max_size: usize) -> Self {
        Self {
            statics,
            dynamic: DynamicTable::with_max_size(max_size),
        }
    }

    /// Resolves `index` against the static table and then the dynamic table.
    /// Index 0 and indices past the end of the dynamic table are illegal.
    pub(crate) fn lookup(&self, index: usize) -> Result<TableEntry<'_>, HpackError> {
        let static_len = self.statics.len();
        let entry = match index {
            0 => None,
            i if i <= static_len => self
                .statics
                .header(i)
                .map(|(name, value)| TableEntry::Static { name, value }),
            i => self.dynamic.header(i - static_len - 1).map(TableEntry::Dynamic),
        };
        entry.ok_or_else(|| ErrorKind::IllegalIndex(index).into())
    }

    pub(crate) fn dynamic(&self) -> &DynamicTable {
        &self.dynamic
    }

    pub(crate) fn dynamic_mut(&mut self) -> &mut DynamicTable {
        &mut self.dynamic
    }
}

/// The [`Dynamic Table`][dynamic_table] implementation of [HPACK].
///
/// [dynamic_table]: https://httpwg.org/specs/rfc7541.html#dynamic.table
/// [HPACK]: https://httpwg.org/specs/rfc7541.html
///
/// # Introduction
/// The dynamic table consists of a list of header fields maintained in
/// first-in, first-out order. The first and newest entry in a dynamic table is
/// at the lowest index, and the oldest entry of a dynamic table is at the
/// highest index.
///
/// The dynamic table can contain duplicate entries (i.e., entries with the same
/// name and same value). Therefore, duplicate entries MUST NOT be treated as an
/// error by a decoder.
///
/// The sum of entry sizes never exceeds `max_size`. Every entry that leaves
/// the table is reported through the `on_evict` callback so that the
/// reference set can forget it in the same step.
pub(crate) struct DynamicTable {
    queue: VecDeque<Entry>,
    curr_size: usize,
    max_size: usize,
    next_id: u64,
}

impl DynamicTable {
    /// Creates a `DynamicTable` based on the size limit.
    pub(crate) fn with_max_size(max_size: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            curr_size: 0,
            max_size,
            next_id: 0,
        }
    }

    pub(crate) fn curr_size(&self) -> usize {
        self.curr_size
    }

    pub(crate) fn max_size(&self) -> usize {
        self.max_size
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    /// Gets an entry by its 0-based position, newest first.
    pub(crate) fn header(&self, index: usize) -> Option<&Entry> {
        self.queue.get(index)
    }

    /// Gets an entry by its identity.
    pub(crate) fn get(&self, id: EntryId) -> Option<&Entry> {
        // Stored identities are consecutive, the newest at the front.
        let newest = self.queue.front()?.id.0;
        let pos = newest.checked_sub(id.0)?;
        self.queue
            .get(usize::try_from(pos).ok()?)
            .filter(|entry| entry.id == id)
    }

    /// Inserts a header field at the front after evicting as many of the
    /// oldest entries as needed. Returns the identity of the new entry, or
    /// `None` if the field is larger than `max_size` on its own, in which
    /// case the table ends up empty.
    pub(crate) fn update<F>(
        &mut self,
        name: Vec<u8>,
        value: Vec<u8>,
        mut on_evict: F,
    ) -> Option<EntryId>
    where
        F: FnMut(EntryId),
    {
        let size = entry_size(name.len(), value.len());
        while self.curr_size + size > self.max_size && !self.queue.is_empty() {
            self.evict_oldest(&mut on_evict);
        }
        if size > self.max_size {
            tracing::trace!(size, max_size = self.max_size, "hpack entry larger than table");
            return None;
        }
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.curr_size += size;
        self.queue.push_front(Entry { id, name, value });
        Some(id)
    }

    /// Updates `DynamicTable`'s size.
    pub(crate) fn update_size<F>(&mut self, max_size: usize, mut on_evict: F)
    where
        F: FnMut(EntryId),
    {
        self.max_size = max_size;
        while self.curr_size > self.max_size && !self.queue.is_empty() {
            self.evict_oldest(&mut on_evict);
        }
    }

    fn evict_oldest<F>(&mut self, on_evict: &mut F)
    where
        F: FnMut(EntryId),
    {
        if let Some(entry) = self.queue.pop_back() {
            self.curr_size -= entry.size();
            tracing::trace!(id = entry.id.0, size = entry.size(), "hpack entry evicted");
            on_evict(entry.id);
        }
    }
}

/// The [`Static Table`][static_table] implementation of [HPACK].
///
/// [static_table]: https://httpwg.org/specs/rfc7541.html#static.table
/// [HPACK]: https://httpwg.org/specs/rfc7541.html
///
/// # Introduction
/// The static table consists of a predefined static list of header fields.
/// Both endpoints of a connection use the same list, so the server and client
/// variants resolve to one table.
pub(crate) struct StaticTable {
    entries: &'static [(&'static str, &'static str)],
}

impl StaticTable {
    /// Gets the static table used by the given side of a connection.
    pub(crate) fn for_role(_server: bool) -> Self {
        Self {
            entries: STATIC_TABLE,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Tries to get a header name and value by the given 1-based index.
    pub(crate) fn header(&self, index: usize) -> Option<(&'static [u8], &'static [u8])> {
        let pos = index.checked_sub(1)?;
        self.entries
            .get(pos)
            .map(|(name, value)| (name.as_bytes(), value.as_bytes()))
    }
}

static STATIC_TABLE: &[(&str, &str)] = &[
    (":authority", ""),                   // 1
    (":method", "GET"),                   // 2
    (":method", "POST"),                  // 3
    (":path", "/"),                       // 4
    (":path", "/index.html"),             // 5
    (":scheme", "http"),                  // 6
    (":scheme", "https"),                 // 7
    (":status", "200"),                   // 8
    (":status", "204"),                   // 9
    (":status", "206"),                   // 10
    (":status", "304"),                   // 11
    (":status", "400"),                   // 12
    (":status", "404"),                   // 13
    (":status", "500"),                   // 14
    ("accept-charset", ""),               // 15
    ("accept-encoding", "gzip, deflate"), // 16
    ("accept-language", ""),              // 17
    ("accept-ranges", ""),                // 18
    ("accept", ""),                       // 19
    ("access-control-allow-origin", ""),  // 20
    ("age", ""),                          // 21
    ("allow", ""),                        // 22
    ("authorization", ""),                // 23
    ("cache-control", ""),                // 24
    ("content-disposition", ""),          // 25
    ("content-encoding", ""),             // 26
    ("content-language", ""),             // 27
    ("content-length", ""),               // 28
    ("content-location", ""),             // 29
    ("content-range", ""),                // 30
    ("content-type", ""),                 // 31
    ("cookie", ""),                       // 32
    ("date", ""),                         // 33
    ("etag", ""),                         // 34
    ("expect", ""),                       // 35
    ("expires", ""),                      // 36
    ("from", ""),                         // 37
    ("host", ""),                         // 38
    ("if-match", ""),                     // 39
    ("if-modified-since", ""),            // 40
    ("if-none-match", ""),                // 41
    ("if-range", ""),                     // 42
    ("if-unmodified-since", ""),          // 43
    ("last-modified", ""),                // 44
    ("link", ""),                         // 45
    ("location", ""),                     // 46
    ("max-forwards", ""),                 // 47
    ("proxy-authenticate", ""),           // 48
    ("proxy-authorization", ""),          // 49
    ("range", ""),                        // 50
    ("referer", ""),                      // 51
    ("refresh", ""),                      // 52
    ("retry-after", ""),                  // 53
    ("server", ""),                       // 54
    ("set-cookie", ""),                   // 55
    ("strict-transport-security", ""),    // 56
    ("transfer-encoding", ""),            // 57
    ("user-agent", ""),                   // 58
    ("vary", ""),                         // 59
    ("via", ""),                          // 60
    ("www-authenticate", ""),             // 61
];
