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

//! Entity handles and the keys the engine derives from them.

use std::fmt;

/// Identity of an entity store. Each world owns exactly one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreId(pub u32);

/// Identity of a loaded world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorldId(pub u32);

/// A lightweight handle to an entity inside a store.
///
/// The handle itself never dangles: it combines the owning store, the slot index
/// and the generation of that slot. Whether it still points at a live entity is
/// answered by the store (`EntityStore::is_valid`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityRef {
    /// The store the entity lives in.
    pub store: StoreId,
    /// Slot index inside the store. Indices are recycled.
    pub index: u32,
    /// Generation of the slot when this handle was issued.
    pub generation: u32,
}

impl EntityRef {
    /// Creates a handle.
    pub const fn new(store: StoreId, index: u32, generation: u32) -> Self {
        Self {
            store,
            index,
            generation,
        }
    }

    /// Returns the cache key for this entity.
    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.store, self.index)
    }
}

/// The 64-bit key under which per-entity baselines are stored.
///
/// Layout: `(store << 32) ^ (index & 0xFFFF_FFFF)`. Indices are per store, so
/// combining them with the store identity keeps keys from different worlds apart,
/// and the upper half always names the owning store.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey(u64);

impl EntityKey {
    /// Builds the key for `index` inside `store`.
    pub const fn new(store: StoreId, index: u32) -> Self {
        Self(((store.0 as u64) << 32) ^ (index as u64 & 0xFFFF_FFFF))
    }

    /// Returns the store that owns the keyed entity.
    pub const fn store_id(self) -> StoreId {
        StoreId((self.0 >> 32) as u32)
    }

    /// Returns the raw 64-bit value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityKey({}:{})", self.0 >> 32, self.0 & 0xFFFF_FFFF)
    }
}
