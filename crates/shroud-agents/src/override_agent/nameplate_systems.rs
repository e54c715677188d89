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

//! Systems watching player nameplates.
//!
//! Removals never clear nameplate baselines: most of them are our own hides.
//! Stale entries are reclaimed by the baseline GC pass instead.

use std::sync::Arc;

use shroud_core::ecs::{AddReason, ComponentType, EntityRef, Query, RemoveReason};
use shroud_core::host::{CommandBuffer, EntityStore, RefChangeSystem, RefSystem};

use crate::engine::EngineSlot;

fn apply(slot: &EngineSlot, entity: EntityRef, store: &dyn EntityStore, buffer: &mut dyn CommandBuffer) {
    if let Some(engine) = slot.get() {
        engine.nameplate_lane().apply(entity, store, Some(buffer), false);
    }
}

/// Hides the nameplate of players as they appear.
pub struct NameplateLifecycleSystem {
    slot: Arc<EngineSlot>,
}

impl NameplateLifecycleSystem {
    /// Creates the system over `slot`.
    pub fn new(slot: Arc<EngineSlot>) -> Self {
        Self { slot }
    }
}

impl RefSystem for NameplateLifecycleSystem {
    fn name(&self) -> &str {
        "NameplateLifecycleSystem"
    }

    fn query(&self) -> Query {
        Query::with(ComponentType::Player).and(ComponentType::Nameplate)
    }

    fn on_entity_added(
        &self,
        entity: EntityRef,
        _reason: AddReason,
        store: &dyn EntityStore,
        buffer: &mut dyn CommandBuffer,
    ) {
        apply(&self.slot, entity, store, buffer);
    }

    fn on_entity_removed(
        &self,
        _entity: EntityRef,
        _reason: RemoveReason,
        _store: &dyn EntityStore,
        _buffer: &mut dyn CommandBuffer,
    ) {
    }
}

/// Re-applies the nameplate override when something rewrites the nameplate.
pub struct NameplateChangeSystem {
    slot: Arc<EngineSlot>,
}

impl NameplateChangeSystem {
    /// Creates the system over `slot`.
    pub fn new(slot: Arc<EngineSlot>) -> Self {
        Self { slot }
    }
}

impl RefChangeSystem for NameplateChangeSystem {
    fn name(&self) -> &str {
        "NameplateChangeSystem"
    }

    fn component_type(&self) -> ComponentType {
        ComponentType::Nameplate
    }

    fn query(&self) -> Query {
        Query::with(ComponentType::Player)
    }

    fn on_component_added(
        &self,
        entity: EntityRef,
        store: &dyn EntityStore,
        buffer: &mut dyn CommandBuffer,
    ) {
        apply(&self.slot, entity, store, buffer);
    }

    fn on_component_set(
        &self,
        entity: EntityRef,
        store: &dyn EntityStore,
        buffer: &mut dyn CommandBuffer,
    ) {
        apply(&self.slot, entity, store, buffer);
    }

    fn on_component_removed(
        &self,
        _entity: EntityRef,
        _store: &dyn EntityStore,
        _buffer: &mut dyn CommandBuffer,
    ) {
    }
}
