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
use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;
use shroud_core::ecs::{EntityKey, Nameplate, StoreId};

/// Mutable part of a nameplate baseline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameplateState {
    /// Last nameplate seen while visible.
    pub baseline: Option<Nameplate>,
    /// Whether the engine currently hides this player's nameplate.
    pub hidden: bool,
}

/// The nameplate baseline of one player.
///
/// Unlike UI baselines the captured value keeps following the live component
/// while the nameplate is visible, so external renames are not lost.
#[derive(Debug, Default)]
pub struct NameplateBaselineEntry {
    state: Mutex<NameplateState>,
}

impl NameplateBaselineEntry {
    /// Locks the entry. A poisoned lock is recovered.
    pub fn lock(&self) -> MutexGuard<'_, NameplateState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> NameplateState {
        self.lock().clone()
    }
}

/// Concurrent map of nameplate baselines keyed by [`EntityKey`].
#[derive(Debug, Default)]
pub struct NameplateBaselineCache {
    entries: DashMap<EntityKey, Arc<NameplateBaselineEntry>>,
}

impl NameplateBaselineCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `key`.
    pub fn get(&self, key: EntityKey) -> Option<Arc<NameplateBaselineEntry>> {
        self.entries.get(&key).map(|entry| Arc::clone(entry.value()))
    }

    /// Returns the entry for `key`, creating an empty one on first observation.
    pub fn get_or_create(&self, key: EntityKey) -> Arc<NameplateBaselineEntry> {
        self.entries.entry(key).or_default().value().clone()
    }

    /// Removes the entry for `key`.
    pub fn remove(&self, key: EntityKey) -> Option<Arc<NameplateBaselineEntry>> {
        self.entries.remove(&key).map(|(_, entry)| entry)
    }

    /// Removes the entries of `store` whose entity is not in `alive`.
    pub fn sweep_store(&self, store: StoreId, alive: &HashSet<EntityKey>) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|key, _| key.store_id() != store || alive.contains(key));
        before.saturating_sub(self.entries.len())
    }

    /// Every key currently tracked.
    pub fn keys(&self) -> Vec<EntityKey> {
        self.entries.iter().map(|entry| *entry.key()).collect()
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
