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

//! Systems watching the UI-component list.

use std::sync::Arc;

use shroud_core::ecs::{AddReason, ComponentType, EntityRef, Query, RemoveReason};
use shroud_core::host::{CommandBuffer, EntityStore, RefChangeSystem, RefSystem};
use shroud_lanes::CategoryHint;

use crate::engine::EngineSlot;

fn apply(slot: &EngineSlot, entity: EntityRef, store: &dyn EntityStore, buffer: &mut dyn CommandBuffer) {
    if let Some(engine) = slot.get() {
        engine
            .ui_lane()
            .apply(entity, store, Some(buffer), CategoryHint::Auto, false);
    }
}

fn forget(slot: &EngineSlot, entity: EntityRef) {
    if let Some(engine) = slot.get() {
        engine.ui_baselines().remove(entity.key());
    }
}

/// Filters the list of every entity that gains one, and forgets the baseline of
/// entities that lose it or despawn.
pub struct UiListLifecycleSystem {
    slot: Arc<EngineSlot>,
}

impl UiListLifecycleSystem {
    /// Creates the system over `slot`.
    pub fn new(slot: Arc<EngineSlot>) -> Self {
        Self { slot }
    }
}

impl RefSystem for UiListLifecycleSystem {
    fn name(&self) -> &str {
        "UiListLifecycleSystem"
    }

    fn query(&self) -> Query {
        Query::with(ComponentType::UiComponentList)
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
        entity: EntityRef,
        _reason: RemoveReason,
        _store: &dyn EntityStore,
        _buffer: &mut dyn CommandBuffer,
    ) {
        forget(&self.slot, entity);
    }
}

/// Re-filters lists that host pipelines overwrite after spawn.
pub struct UiListChangeSystem {
    slot: Arc<EngineSlot>,
}

impl UiListChangeSystem {
    /// Creates the system over `slot`.
    pub fn new(slot: Arc<EngineSlot>) -> Self {
        Self { slot }
    }
}

impl RefChangeSystem for UiListChangeSystem {
    fn name(&self) -> &str {
        "UiListChangeSystem"
    }

    fn component_type(&self) -> ComponentType {
        ComponentType::UiComponentList
    }

    fn query(&self) -> Query {
        Query::with(ComponentType::UiComponentList)
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
        entity: EntityRef,
        _store: &dyn EntityStore,
        _buffer: &mut dyn CommandBuffer,
    ) {
        forget(&self.slot, entity);
    }
}
