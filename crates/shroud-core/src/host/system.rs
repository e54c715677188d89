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

//! Reactive ECS systems the host drives.

use crate::ecs::{AddReason, ComponentType, EntityRef, Query, RemoveReason};

use super::store::{CommandBuffer, EntityStore};

/// Reacts to entities starting or stopping to match a query.
pub trait RefSystem: Send + Sync {
    /// System name, for logs.
    fn name(&self) -> &str;

    /// The archetype filter.
    fn query(&self) -> Query;

    /// Called once an entity matches the query.
    fn on_entity_added(
        &self,
        entity: EntityRef,
        reason: AddReason,
        store: &dyn EntityStore,
        buffer: &mut dyn CommandBuffer,
    );

    /// Called when an entity stops matching the query or is despawned.
    fn on_entity_removed(
        &self,
        entity: EntityRef,
        reason: RemoveReason,
        store: &dyn EntityStore,
        buffer: &mut dyn CommandBuffer,
    );
}

/// Reacts to one component type being added, replaced or removed.
pub trait RefChangeSystem: Send + Sync {
    /// System name, for logs.
    fn name(&self) -> &str;

    /// The watched component type.
    fn component_type(&self) -> ComponentType;

    /// Entities must also match this filter for the callbacks to fire.
    fn query(&self) -> Query;

    /// The component was attached.
    fn on_component_added(
        &self,
        entity: EntityRef,
        store: &dyn EntityStore,
        buffer: &mut dyn CommandBuffer,
    );

    /// The component was replaced.
    fn on_component_set(
        &self,
        entity: EntityRef,
        store: &dyn EntityStore,
        buffer: &mut dyn CommandBuffer,
    );

    /// The component was detached.
    fn on_component_removed(
        &self,
        entity: EntityRef,
        store: &dyn EntityStore,
        buffer: &mut dyn CommandBuffer,
    );
}
