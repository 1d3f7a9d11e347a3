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

//! The reference set of the decoding context.
//!
//! The reference set holds the dynamic table entries that are part of the
//! header list implicitly. An entry stays in the set from one header block to
//! the next until it is toggled off by an indexed representation, evicted
//! from the dynamic table, or the whole set is emptied by an encoding context
//! update. At the end of a header block, every member that has not been
//! emitted during that block is emitted.
//!
//! Members are kept by [`EntryId`], never by index, because indices shift on
//! every insertion.

use std::collections::BTreeMap;

use crate::table::EntryId;

/// Result of `ReferenceSet::toggle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Toggle {
    /// The entry joined the set and has to be emitted.
    Added,
    /// The entry left the set. Nothing is emitted.
    Removed,
}

/// Members of the reference set together with the per-block bookkeeping.
pub(crate) struct ReferenceSet {
    // Member -> whether it was emitted in the current header block.
    // Ordered by identity, which is insertion order.
    active: BTreeMap<EntryId, bool>,
}

impl ReferenceSet {
    pub(crate) fn new() -> Self {
        Self {
            active: BTreeMap::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.active.len()
    }

    /// Adds `id` if absent, removes it if present. An added entry counts as
    /// emitted for the current block.
    pub(crate) fn toggle(&mut self, id: EntryId) -> Toggle {
        match self.active.remove(&id) {
            Some(_) => Toggle::Removed,
            None => {
                self.active.insert(id, true);
                Toggle::Added
            }
        }
    }

    /// Adds an entry that has just been inserted by a literal with
    /// incremental indexing and emitted already.
    pub(crate) fn insert_emitted(&mut self, id: EntryId) {
        self.active.insert(id, true);
    }

    /// Forgets an entry that left the dynamic table.
    pub(crate) fn on_evict(&mut self, id: EntryId) {
        self.active.remove(&id);
    }

    /// Removes every member.
    pub(crate) fn clear(&mut self) {
        self.active.clear();
    }

    /// Members not emitted in the current block, oldest first.
    pub(crate) fn unemitted(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.active
            .iter()
            .filter(|(_, emitted)| !**emitted)
            .map(|(id, _)| *id)
    }

    /// Resets the per-block bookkeeping. Membership carries over to the next
    /// block.
    pub(crate) fn end_block(&mut self) {
        self.active.values_mut().for_each(|emitted| *emitted = false);
    }
}
