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

//! Host revision compatibility.
//!
//! Server builds differ in which optional APIs they expose. Instead of probing on
//! every call, the plugin asks the host once per [`HostFeature`] at startup and
//! freezes the answers in a [`HostFeatures`] value. The engine then talks to the
//! host through a [`HostCompat`] implementation built from those answers, so a new
//! host revision is a new preset or a new implementation of the trait.

use std::sync::Arc;

use super::map::{MarkerAccess, WorldMapManager};
use super::store::{CommandBuffer, EntityHandle, EntityStore};
use super::world::{HostWorld, NpcRef, PlayerRef, WorldTask};
use super::ServerHost;
use crate::ecs::{ComponentType, EntityRef, WorldId};

/// An optional host capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostFeature {
    /// `world.execute(task)` hops onto the world thread.
    WorldExecutor,
    /// The world exposes its entity store for chunked iteration.
    WorldStoreAccess,
    /// The world can enumerate its NPCs.
    NpcEnumeration,
    /// Write batches support component removal.
    BufferRemove,
    /// Stores support direct component removal.
    StoreRemove,
    /// Remove-then-put on a batch forces clients to rebuild the component.
    RecreateOnRewrite,
}

impl HostFeature {
    /// Every feature, in probe order.
    pub const ALL: [HostFeature; 6] = [
        HostFeature::WorldExecutor,
        HostFeature::WorldStoreAccess,
        HostFeature::NpcEnumeration,
        HostFeature::BufferRemove,
        HostFeature::StoreRemove,
        HostFeature::RecreateOnRewrite,
    ];
}

/// Frozen answers to the startup feature probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostFeatures {
    /// See [`HostFeature::WorldExecutor`].
    pub world_executor: bool,
    /// See [`HostFeature::WorldStoreAccess`].
    pub world_store_access: bool,
    /// See [`HostFeature::NpcEnumeration`].
    pub npc_enumeration: bool,
    /// See [`HostFeature::BufferRemove`].
    pub buffer_remove: bool,
    /// See [`HostFeature::StoreRemove`].
    pub store_remove: bool,
    /// See [`HostFeature::RecreateOnRewrite`].
    pub recreate_on_rewrite: bool,
}

impl HostFeatures {
    /// Current server builds: everything available.
    pub const CURRENT: HostFeatures = HostFeatures {
        world_executor: true,
        world_store_access: true,
        npc_enumeration: true,
        buffer_remove: true,
        store_remove: true,
        recreate_on_rewrite: true,
    };

    /// Early server builds: no store access, no NPC enumeration, no removal.
    pub const LEGACY: HostFeatures = HostFeatures {
        world_executor: true,
        world_store_access: false,
        npc_enumeration: false,
        buffer_remove: false,
        store_remove: false,
        recreate_on_rewrite: false,
    };

    /// Nothing optional is available.
    pub const NONE: HostFeatures = HostFeatures {
        world_executor: false,
        world_store_access: false,
        npc_enumeration: false,
        buffer_remove: false,
        store_remove: false,
        recreate_on_rewrite: false,
    };

    /// Runs every probe once against `host`.
    pub fn probe(host: &dyn ServerHost) -> Self {
        let mut features = HostFeatures::NONE;
        for feature in HostFeature::ALL {
            features.set(feature, host.probe(feature));
        }
        features
    }

    /// Returns the answer for `feature`.
    pub fn has(&self, feature: HostFeature) -> bool {
        match feature {
            HostFeature::WorldExecutor => self.world_executor,
            HostFeature::WorldStoreAccess => self.world_store_access,
            HostFeature::NpcEnumeration => self.npc_enumeration,
            HostFeature::BufferRemove => self.buffer_remove,
            HostFeature::StoreRemove => self.store_remove,
            HostFeature::RecreateOnRewrite => self.recreate_on_rewrite,
        }
    }

    /// Overrides the answer for `feature`.
    pub fn set(&mut self, feature: HostFeature, available: bool) {
        let slot = match feature {
            HostFeature::WorldExecutor => &mut self.world_executor,
            HostFeature::WorldStoreAccess => &mut self.world_store_access,
            HostFeature::NpcEnumeration => &mut self.npc_enumeration,
            HostFeature::BufferRemove => &mut self.buffer_remove,
            HostFeature::StoreRemove => &mut self.store_remove,
            HostFeature::RecreateOnRewrite => &mut self.recreate_on_rewrite,
        };
        *slot = available;
    }
}

/// The engine's view of a host revision.
///
/// Every method fails closed: a missing API yields `None`/`false`, is logged once,
/// and the dependent feature path is skipped.
pub trait HostCompat: Send + Sync {
    /// The frozen probe results.
    fn features(&self) -> HostFeatures;

    /// Runs `task` on the world's execution context, or inline when the world
    /// has none.
    fn run_on_world(&self, world: &Arc<dyn HostWorld>, task: WorldTask);

    /// The world's store, when reachable.
    fn world_store(&self, world: &dyn HostWorld) -> Option<Arc<dyn EntityStore>>;

    /// The world's NPCs, when the revision can enumerate them.
    fn npc_refs(&self, world: &dyn HostWorld) -> Option<Vec<NpcRef>>;

    /// Resolves a player reference to its live entity.
    fn player_entity(&self, player: &PlayerRef) -> Option<EntityHandle>;

    /// Resolves an NPC reference to its live entity.
    fn npc_entity(&self, npc: &NpcRef) -> Option<EntityHandle>;

    /// Queues a component removal on `buffer`; `false` if the revision cannot.
    fn remove_in_buffer(
        &self,
        buffer: &mut dyn CommandBuffer,
        entity: EntityRef,
        ty: ComponentType,
    ) -> bool;

    /// Removes a component directly from `store`; `false` if the revision cannot.
    fn remove_in_store(&self, store: &dyn EntityStore, entity: EntityRef, ty: ComponentType)
        -> bool;

    /// Returns `true` if remove-then-put forces a client-side rebuild.
    fn recreate_on_rewrite(&self) -> bool;

    /// The cached marker-provider access strategy for `world`.
    fn marker_access(&self, world: &dyn HostWorld, manager: &dyn WorldMapManager) -> MarkerAccess;

    /// Drops every per-world cache entry for `world`.
    fn forget_world(&self, world: WorldId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_has_agree() {
        let mut features = HostFeatures::NONE;
        for feature in HostFeature::ALL {
            assert!(!features.has(feature));
            features.set(feature, true);
            assert!(features.has(feature));
        }
        assert_eq!(features, HostFeatures::CURRENT);
    }

    #[test]
    fn test_legacy_keeps_executor_only() {
        let legacy = HostFeatures::LEGACY;
        assert!(legacy.has(HostFeature::WorldExecutor));
        assert!(!legacy.has(HostFeature::NpcEnumeration));
        assert!(!legacy.has(HostFeature::BufferRemove));
    }
}
