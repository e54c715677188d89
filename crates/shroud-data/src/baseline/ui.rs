// Copyright 2025 eraflo
//
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

use std::collections::HashSet;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use shroud_core::config::TargetCategory;
use shroud_core::ecs::{EntityKey, StoreId, UiComponentId};

/// What kind of entity a baseline was captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EntryKind {
    /// Captured before the category was known. Never swept.
    Unknown = 0,
    /// A player entity.
    Player = 1,
    /// An NPC entity.
    Npc = 2,
}

impl EntryKind {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => EntryKind::Player,
            2 => EntryKind::Npc,
            _ => EntryKind::Unknown,
        }
    }
}

impl From<TargetCategory> for EntryKind {
    fn from(category: TargetCategory) -> Self {
        match category {
            TargetCategory::Player => EntryKind::Player,
            TargetCategory::Npc => EntryKind::Npc,
        }
    }
}

/// The kinds a sweep is allowed to reclaim.
///
/// A sweep may only remove entries of a kind it actually enumerated, otherwise
/// an entity that simply was not listed would lose its baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepKinds {
    /// Player entries may be removed.
    pub players: bool,
    /// NPC entries may be removed.
    pub npcs: bool,
}

impl SweepKinds {
    /// Both player and NPC entries.
    pub const BOTH: SweepKinds = SweepKinds {
        players: true,
        npcs: true,
    };

    /// Returns `true` if entries of `kind` may be removed.
    pub fn allows(&self, kind: EntryKind) -> bool {
        match kind {
            EntryKind::Player => self.players,
            EntryKind::Npc => self.npcs,
            EntryKind::Unknown => false,
        }
    }

    /// Returns `true` if nothing may be removed.
    pub fn is_empty(&self) -> bool {
        !self.players && !self.npcs
    }
}

/// The original UI-component id list of one entity.
///
/// The id list is frozen at creation. Only the kind tag can change, and only
/// from [`EntryKind::Unknown`] to a concrete kind.
#[derive(Debug)]
pub struct UiBaselineEntry {
    ids: Arc<[UiComponentId]>,
    kind: AtomicU8,
}

impl UiBaselineEntry {
    /// Creates an entry from an already deduplicated id list.
    pub fn new(ids: Vec<UiComponentId>, kind: EntryKind) -> Self {
        Self {
            ids: ids.into(),
            kind: AtomicU8::new(kind as u8),
        }
    }

    /// The captured ids, in original order without duplicates.
    pub fn ids(&self) -> &[UiComponentId] {
        &self.ids
    }

    /// The current kind tag.
    pub fn kind(&self) -> EntryKind {
        EntryKind::from_u8(self.kind.load(Ordering::Acquire))
    }

    /// Upgrades an `Unknown` tag to `kind`. Concrete tags never change.
    ///
    /// Returns `true` if the tag changed.
    pub fn promote(&self, kind: EntryKind) -> bool {
        if kind == EntryKind::Unknown {
            return false;
        }
        self.kind
            .compare_exchange(
                EntryKind::Unknown as u8,
                kind as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

/// Concurrent map of UI baselines keyed by [`EntityKey`].
#[derive(Debug, Default)]
pub struct UiBaselineCache {
    entries: DashMap<EntityKey, Arc<UiBaselineEntry>>,
}

impl UiBaselineCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `key`.
    pub fn get(&self, key: EntityKey) -> Option<Arc<UiBaselineEntry>> {
        self.entries.get(&key).map(|entry| Arc::clone(entry.value()))
    }

    /// Returns the entry for `key`, inserting the one built by `create` if absent.
    ///
    /// The boolean is `true` when this call inserted the entry.
    pub fn get_or_insert_with(
        &self,
        key: EntityKey,
        create: impl FnOnce() -> UiBaselineEntry,
    ) -> (Arc<UiBaselineEntry>, bool) {
        let mut created = false;
        let entry = self
            .entries
            .entry(key)
            .or_insert_with(|| {
                created = true;
                Arc::new(create())
            })
            .value()
            .clone();
        (entry, created)
    }

    /// Removes the entry for `key`.
    pub fn remove(&self, key: EntityKey) -> Option<Arc<UiBaselineEntry>> {
        self.entries.remove(&key).map(|(_, entry)| entry)
    }

    /// Removes the entry for `key` only if it is still `expected`.
    ///
    /// A concurrent caller may have replaced the entry in between; in that case
    /// the newer entry is kept.
    pub fn remove_if_same(&self, key: EntityKey, expected: &Arc<UiBaselineEntry>) -> bool {
        self.entries
            .remove_if(&key, |_, current| Arc::ptr_eq(current, expected))
            .is_some()
    }

    /// Removes the entries of `store` whose entity is not in `alive` and whose
    /// kind is allowed by `kinds`. Returns the number of removed entries.
    pub fn sweep_store(
        &self,
        store: StoreId,
        alive: &HashSet<EntityKey>,
        kinds: SweepKinds,
    ) -> usize {
        if kinds.is_empty() {
            return 0;
        }
        let before = self.entries.len();
        self.entries.retain(|key, entry| {
            key.store_id() != store || alive.contains(key) || !kinds.allows(entry.kind())
        });
        before.saturating_sub(self.entries.len())
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(store: u32, index: u32) -> EntityKey {
        EntityKey::new(StoreId(store), index)
    }

    #[test]
    fn test_get_or_insert_with_creates_once() {
        let cache = UiBaselineCache::new();
        let (first, created) =
            cache.get_or_insert_with(key(1, 1), || UiBaselineEntry::new(vec![1, 2], EntryKind::Player));
        assert!(created);
        let (second, created) =
            cache.get_or_insert_with(key(1, 1), || UiBaselineEntry::new(vec![9], EntryKind::Npc));
        assert!(!created, "existing entry must be returned untouched");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.ids(), &[1, 2]);
    }

    #[test]
    fn test_remove_if_same_keeps_replaced_entry() {
        let cache = UiBaselineCache::new();
        let (stale, _) =
            cache.get_or_insert_with(key(1, 1), || UiBaselineEntry::new(vec![1], EntryKind::Player));
        cache.remove(key(1, 1));
        let (fresh, _) =
            cache.get_or_insert_with(key(1, 1), || UiBaselineEntry::new(vec![2], EntryKind::Player));

        assert!(!cache.remove_if_same(key(1, 1), &stale));
        assert_eq!(cache.len(), 1);
        assert!(cache.remove_if_same(key(1, 1), &fresh));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_kind_promotion_is_monotonic() {
        let entry = UiBaselineEntry::new(vec![], EntryKind::Unknown);
        assert!(!entry.promote(EntryKind::Unknown));
        assert!(entry.promote(EntryKind::Npc));
        assert_eq!(entry.kind(), EntryKind::Npc);
        assert!(!entry.promote(EntryKind::Player), "concrete kinds never change");
        assert_eq!(entry.kind(), EntryKind::Npc);
    }

    #[test]
    fn test_sweep_respects_store_alive_and_kind() {
        let cache = UiBaselineCache::new();
        let insert = |k, kind| {
            cache.get_or_insert_with(k, || UiBaselineEntry::new(vec![1], kind));
        };
        insert(key(1, 1), EntryKind::Player); // alive
        insert(key(1, 2), EntryKind::Player); // dead
        insert(key(1, 3), EntryKind::Npc); // dead, kind not allowed
        insert(key(1, 4), EntryKind::Unknown); // dead, never swept
        insert(key(2, 2), EntryKind::Player); // other store

        let alive: HashSet<_> = [key(1, 1)].into_iter().collect();
        let kinds = SweepKinds {
            players: true,
            npcs: false,
        };
        let removed = cache.sweep_store(StoreId(1), &alive, kinds);

        assert_eq!(removed, 1);
        assert!(cache.get(key(1, 2)).is_none());
        assert!(cache.get(key(1, 1)).is_some());
        assert!(cache.get(key(1, 3)).is_some());
        assert!(cache.get(key(1, 4)).is_some());
        assert!(cache.get(key(2, 2)).is_some());
    }

    #[test]
    fn test_sweep_with_no_kinds_is_noop() {
        let cache = UiBaselineCache::new();
        cache.get_or_insert_with(key(1, 1), || UiBaselineEntry::new(vec![1], EntryKind::Npc));
        let removed = cache.sweep_store(StoreId(1), &HashSet::new(), SweepKinds::default());
        assert_eq!(removed, 0);
        assert_eq!(cache.len(), 1);
    }
}
