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

//! Entity stores, write batches and chunked iteration.

use std::fmt;
use std::sync::Arc;

use crate::ecs::{ComponentType, ComponentValue, EntityRef, HostComponent, Query, StoreId};
use crate::HostError;

/// Per-world container of entities and components.
///
/// Direct writes through the store take effect immediately. Inside ECS callbacks
/// the host hands out a [`CommandBuffer`] instead, and writes must go through it.
pub trait EntityStore: Send + Sync {
    /// Identity of this store.
    fn id(&self) -> StoreId;

    /// Returns `true` if `entity` still points at a live entity.
    fn is_valid(&self, entity: EntityRef) -> bool;

    /// Returns `true` if `entity` carries a component of type `ty`.
    fn has_component(&self, entity: EntityRef, ty: ComponentType) -> Result<bool, HostError>;

    /// Reads a data component. Marker types always read as `None`.
    fn component(
        &self,
        entity: EntityRef,
        ty: ComponentType,
    ) -> Result<Option<ComponentValue>, HostError>;

    /// Adds or replaces a data component.
    fn put_component(&self, entity: EntityRef, value: ComponentValue) -> Result<(), HostError>;

    /// Removes a component. `Unsupported` on revisions without direct removal.
    fn remove_component(&self, entity: EntityRef, ty: ComponentType) -> Result<(), HostError>;

    /// Visits every chunk of entities matching `query`, handing each chunk a
    /// write batch that is applied when the visitor returns.
    fn for_each_chunk(
        &self,
        query: &Query,
        visitor: &mut dyn FnMut(&ArchetypeChunk, &mut dyn CommandBuffer),
    ) -> Result<(), HostError>;
}

/// Typed helpers over [`EntityStore`].
pub trait EntityStoreExt {
    /// Reads a typed data component.
    fn get<T: HostComponent>(&self, entity: EntityRef) -> Result<Option<T>, HostError>;

    /// Writes a typed data component.
    fn put<T: HostComponent>(&self, entity: EntityRef, value: T) -> Result<(), HostError>;
}

impl<S: EntityStore + ?Sized> EntityStoreExt for S {
    fn get<T: HostComponent>(&self, entity: EntityRef) -> Result<Option<T>, HostError> {
        Ok(self.component(entity, T::TYPE)?.and_then(T::from_value))
    }

    fn put<T: HostComponent>(&self, entity: EntityRef, value: T) -> Result<(), HostError> {
        self.put_component(entity, value.into_value())
    }
}

/// A buffered write handle, valid for the duration of one callback or chunk.
pub trait CommandBuffer {
    /// Queues an add-or-replace of a data component.
    fn put_component(&mut self, entity: EntityRef, value: ComponentValue);

    /// Queues a component removal. `Unsupported` on revisions without it.
    fn remove_component(&mut self, entity: EntityRef, ty: ComponentType) -> Result<(), HostError>;
}

/// A batch of entities sharing one archetype.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchetypeChunk {
    entities: Vec<EntityRef>,
}

impl ArchetypeChunk {
    /// Wraps the entity handles of one chunk.
    pub fn new(entities: Vec<EntityRef>) -> Self {
        Self { entities }
    }

    /// Number of entities in the chunk.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the chunk is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Handle of the entity at `row`.
    pub fn reference(&self, row: usize) -> Option<EntityRef> {
        self.entities.get(row).copied()
    }

    /// Every entity handle in row order.
    pub fn references(&self) -> impl Iterator<Item = EntityRef> + '_ {
        self.entities.iter().copied()
    }
}

/// An entity handle together with the store that owns it.
#[derive(Clone)]
pub struct EntityHandle {
    /// The entity.
    pub entity: EntityRef,
    /// The store the entity lives in.
    pub store: Arc<dyn EntityStore>,
}

impl EntityHandle {
    /// Pairs `entity` with `store`.
    pub fn new(entity: EntityRef, store: Arc<dyn EntityStore>) -> Self {
        Self { entity, store }
    }

    /// Returns `true` if the entity is still alive.
    pub fn is_valid(&self) -> bool {
        self.store.is_valid(self.entity)
    }
}

impl fmt::Debug for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityHandle")
            .field("entity", &self.entity)
            .field("store", &self.store.id())
            .finish()
    }
}
