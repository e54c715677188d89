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

//! The feature-probed [`HostCompat`] implementation.
//!
//! Host features are probed once when the plugin starts. Per-world lookups (the
//! world executor and the map provider access strategy) are resolved on first use
//! and cached, including failures, so hot paths never probe again.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use shroud_core::diagnostics::WarnOnce;
use shroud_core::ecs::{ComponentType, EntityRef, WorldId};
use shroud_core::host::{
    CommandBuffer, EntityHandle, EntityStore, HostCompat, HostFeatures, HostWorld, MarkerAccess,
    NpcRef, PlayerRef, ServerHost, WorldExecutor, WorldMapManager, WorldTask,
};
use shroud_core::{HostError, LOG_PREFIX};

/// A [`HostCompat`] built from the features the host reported at startup.
pub struct ProbedCompat {
    features: HostFeatures,
    executors: DashMap<WorldId, Option<Arc<dyn WorldExecutor>>>,
    markers: DashMap<WorldId, MarkerAccess>,
    store_access: WarnOnce,
    buffer_remove: WarnOnce,
    store_remove: WarnOnce,
    execute_failed: WarnOnce,
}

impl ProbedCompat {
    /// Probes `host` and freezes the answers.
    pub fn probe(host: &dyn ServerHost) -> Self {
        let features = HostFeatures::probe(host);
        log::info!("{} Host features: {:?}", LOG_PREFIX, features);
        Self::new(features)
    }

    /// Uses an already known feature set.
    pub fn new(features: HostFeatures) -> Self {
        Self {
            features,
            executors: DashMap::new(),
            markers: DashMap::new(),
            store_access: WarnOnce::new(),
            buffer_remove: WarnOnce::new(),
            store_remove: WarnOnce::new(),
            execute_failed: WarnOnce::new(),
        }
    }

    fn executor(&self, world: &dyn HostWorld) -> Option<Arc<dyn WorldExecutor>> {
        let id = world.id();
        if let Some(cached) = self.executors.get(&id) {
            return cached.value().clone();
        }
        let resolved = if self.features.world_executor {
            world.executor().ok()
        } else {
            None
        };
        if resolved.is_none() {
            log::warn!(
                "{} World.execute not accessible on world '{}'; running tasks directly (may be unsafe)",
                LOG_PREFIX,
                world.name()
            );
        }
        self.executors.entry(id).or_insert(resolved).value().clone()
    }

    fn removal_result(latch: &WarnOnce, what: &'static str, result: Result<(), HostError>) -> bool {
        match result {
            Ok(()) => true,
            Err(err) if err.is_unsupported() => {
                latch.warn(|| format!("{} not available; falling back to rewrites", what));
                false
            }
            Err(err) => {
                log::debug!("{} {} failed: {}", LOG_PREFIX, what, err);
                false
            }
        }
    }
}

fn take(slot: &Mutex<Option<WorldTask>>) -> Option<WorldTask> {
    slot.lock().unwrap_or_else(|e| e.into_inner()).take()
}

impl HostCompat for ProbedCompat {
    fn features(&self) -> HostFeatures {
        self.features
    }

    fn run_on_world(&self, world: &Arc<dyn HostWorld>, task: WorldTask) {
        let Some(executor) = self.executor(world.as_ref()) else {
            task();
            return;
        };
        // The executor consumes the task even when it refuses it; the shared slot
        // lets us run it here instead.
        let slot = Arc::new(Mutex::new(Some(task)));
        let posted = Arc::clone(&slot);
        let result = executor.execute(Box::new(move || {
            if let Some(task) = take(&posted) {
                task();
            }
        }));
        if let Err(err) = result {
            self.execute_failed.warn(|| {
                format!(
                    "World.execute failed (world={}): {}; running task directly",
                    world.name(),
                    err
                )
            });
            if let Some(task) = take(&slot) {
                task();
            }
        }
    }

    fn world_store(&self, world: &dyn HostWorld) -> Option<Arc<dyn EntityStore>> {
        if !self.features.world_store_access {
            return None;
        }
        match world.entity_store() {
            Ok(store) => Some(store),
            Err(err) => {
                self.store_access.warn(|| {
                    format!("World store not accessible ({}); using player references", err)
                });
                None
            }
        }
    }

    fn npc_refs(&self, world: &dyn HostWorld) -> Option<Vec<NpcRef>> {
        if !self.features.npc_enumeration {
            return None;
        }
        match world.npc_refs() {
            Ok(refs) => Some(refs),
            Err(err) => {
                log::debug!("{} NPC enumeration skipped: {}", LOG_PREFIX, err);
                None
            }
        }
    }

    fn player_entity(&self, player: &PlayerRef) -> Option<EntityHandle> {
        player.reference().filter(|handle| handle.is_valid()).cloned()
    }

    fn npc_entity(&self, npc: &NpcRef) -> Option<EntityHandle> {
        npc.reference().filter(|handle| handle.is_valid()).cloned()
    }

    fn remove_in_buffer(
        &self,
        buffer: &mut dyn CommandBuffer,
        entity: EntityRef,
        ty: ComponentType,
    ) -> bool {
        if !self.features.buffer_remove {
            return false;
        }
        Self::removal_result(
            &self.buffer_remove,
            "CommandBuffer.removeComponent",
            buffer.remove_component(entity, ty),
        )
    }

    fn remove_in_store(
        &self,
        store: &dyn EntityStore,
        entity: EntityRef,
        ty: ComponentType,
    ) -> bool {
        if !self.features.store_remove {
            return false;
        }
        Self::removal_result(
            &self.store_remove,
            "Store.removeComponent",
            store.remove_component(entity, ty),
        )
    }

    fn recreate_on_rewrite(&self) -> bool {
        self.features.recreate_on_rewrite && self.features.buffer_remove
    }

    fn marker_access(&self, world: &dyn HostWorld, manager: &dyn WorldMapManager) -> MarkerAccess {
        let id = world.id();
        if let Some(cached) = self.markers.get(&id) {
            return cached.value().clone();
        }
        let access = MarkerAccess::resolve(manager);
        if access.is_available() {
            log::debug!("{} Map providers on '{}' reached via {:?}", LOG_PREFIX, world.name(), access);
        } else {
            log::warn!(
                "{} Map provider table not accessible on world '{}'; player marker hiding disabled there",
                LOG_PREFIX,
                world.name()
            );
        }
        self.markers.entry(id).or_insert(access).value().clone()
    }

    fn forget_world(&self, world: WorldId) {
        self.executors.remove(&world);
        self.markers.remove(&world);
    }
}
