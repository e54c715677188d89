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

//! In-memory entity store.
//!
//! Entities live in generational slots. Every mutation, direct or buffered, goes
//! through one commit step that applies a batch of writes under the state lock
//! and returns the resulting change and archetype events. Events are dispatched
//! to the registered systems only after the lock is released, and the write
//! batches handed to those systems are committed the same way, so a system
//! observes the consequences of its own writes.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use shroud_core::ecs::{
    AddReason, ComponentType, ComponentValue, EntityRef, Nameplate, Query, RemoveReason, StoreId,
    UiComponentId, UiComponentList,
};
use shroud_core::host::{
    ArchetypeChunk, CommandBuffer, EntityStore, EntityStoreExt, HostFeatures, RefChangeSystem,
    RefSystem,
};
use shroud_core::{HostError, LOG_PREFIX};

/// Entities handed to one chunk visitor call.
pub const CHUNK_CAPACITY: usize = 64;

/// Nesting limit for systems reacting to writes made by systems.
const MAX_DISPATCH_DEPTH: usize = 16;

type Archetype = HashSet<ComponentType>;

/// Systems registered with the server, shared by every store.
#[derive(Default)]
pub struct SystemRegistry {
    ref_systems: RwLock<Vec<Arc<dyn RefSystem>>>,
    change_systems: RwLock<Vec<Arc<dyn RefChangeSystem>>>,
}

impl SystemRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a lifecycle system.
    pub fn add_ref_system(&self, system: Arc<dyn RefSystem>) {
        log::debug!("Registering ref system '{}'", system.name());
        self.ref_systems
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(system);
    }

    /// Registers a change system.
    pub fn add_change_system(&self, system: Arc<dyn RefChangeSystem>) {
        log::debug!("Registering change system '{}'", system.name());
        self.change_systems
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(system);
    }

    /// Snapshot of the lifecycle systems.
    pub fn ref_systems(&self) -> Vec<Arc<dyn RefSystem>> {
        self.ref_systems
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Snapshot of the change systems.
    pub fn change_systems(&self) -> Vec<Arc<dyn RefChangeSystem>> {
        self.change_systems
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Total number of registered systems.
    pub fn len(&self) -> usize {
        self.ref_systems().len() + self.change_systems().len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
enum Write {
    Put(ComponentValue),
    Remove(ComponentType),
}

impl Write {
    fn component_type(&self) -> ComponentType {
        match self {
            Write::Put(value) => value.component_type(),
            Write::Remove(ty) => *ty,
        }
    }
}

/// A write batch. Committed by the store when the callback or chunk visitor
/// that received it returns.
#[derive(Debug)]
pub struct MemoryBuffer {
    writes: Vec<(EntityRef, Write)>,
    remove_supported: bool,
}

impl MemoryBuffer {
    /// An empty batch. Removals fail with `Unsupported` unless `remove_supported`.
    pub fn new(remove_supported: bool) -> Self {
        Self {
            writes: Vec::new(),
            remove_supported,
        }
    }

    /// Number of queued writes.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

impl CommandBuffer for MemoryBuffer {
    fn put_component(&mut self, entity: EntityRef, value: ComponentValue) {
        self.writes.push((entity, Write::Put(value)));
    }

    fn remove_component(&mut self, entity: EntityRef, ty: ComponentType) -> Result<(), HostError> {
        if !self.remove_supported {
            return Err(HostError::Unsupported("CommandBuffer::removeComponent"));
        }
        self.writes.push((entity, Write::Remove(ty)));
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    alive: bool,
    // Markers map to `None`.
    components: HashMap<ComponentType, Option<ComponentValue>>,
}

impl Slot {
    fn archetype(&self) -> Archetype {
        self.components.keys().copied().collect()
    }
}

#[derive(Debug)]
struct StoreState {
    id: StoreId,
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl StoreState {
    fn slot(&self, entity: EntityRef) -> Option<&Slot> {
        if entity.store != self.id {
            return None;
        }
        self.slots
            .get(entity.index as usize)
            .filter(|slot| slot.alive && slot.generation == entity.generation)
    }

    fn slot_mut(&mut self, entity: EntityRef) -> Option<&mut Slot> {
        if entity.store != self.id {
            return None;
        }
        self.slots
            .get_mut(entity.index as usize)
            .filter(|slot| slot.alive && slot.generation == entity.generation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Added,
    Set,
    Removed,
}

struct ChangeEvent {
    entity: EntityRef,
    ty: ComponentType,
    change: Change,
}

struct ArchetypeEvent {
    entity: EntityRef,
    before: Archetype,
    after: Archetype,
}

#[derive(Default)]
struct Events {
    changes: Vec<ChangeEvent>,
    archetypes: Vec<ArchetypeEvent>,
}

/// The entity store of one world.
pub struct MemoryStore {
    id: StoreId,
    features: HostFeatures,
    systems: Arc<SystemRegistry>,
    state: Mutex<StoreState>,
    writes: AtomicUsize,
    rebuilds: AtomicUsize,
    failing: AtomicBool,
    read_only: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store dispatching to `systems`.
    pub fn new(id: StoreId, features: HostFeatures, systems: Arc<SystemRegistry>) -> Self {
        Self {
            id,
            features,
            systems,
            state: Mutex::new(StoreState {
                id,
                slots: Vec::new(),
                free: Vec::new(),
            }),
            writes: AtomicUsize::new(0),
            rebuilds: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            read_only: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(&self) -> Result<(), HostError> {
        if self.failing.load(Ordering::Acquire) {
            return Err(HostError::Store("store is busy".into()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), HostError> {
        self.check()?;
        if self.read_only.load(Ordering::Acquire) {
            return Err(HostError::Store("store is read-only".into()));
        }
        Ok(())
    }

    fn buffer(&self) -> MemoryBuffer {
        MemoryBuffer::new(self.features.buffer_remove)
    }

    /// Spawns an entity carrying `values` and the `markers` types.
    pub fn spawn(&self, values: Vec<ComponentValue>, markers: &[ComponentType]) -> EntityRef {
        let (entity, archetype) = {
            let mut state = self.lock();
            let index = match state.free.pop() {
                Some(index) => index,
                None => {
                    state.slots.push(Slot::default());
                    (state.slots.len() - 1) as u32
                }
            };
            let slot = &mut state.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.alive = true;
            slot.components.clear();
            for marker in markers {
                slot.components.insert(*marker, None);
            }
            for value in values {
                slot.components.insert(value.component_type(), Some(value));
            }
            (
                EntityRef::new(self.id, index, slot.generation),
                slot.archetype(),
            )
        };

        for system in self.systems.ref_systems() {
            if !system.query().matches(|ty| archetype.contains(&ty)) {
                continue;
            }
            let mut buffer = self.buffer();
            system.on_entity_added(entity, AddReason::Spawn, self, &mut buffer);
            self.flush(buffer, 1);
        }
        entity
    }

    /// Despawns `entity`. Returns `false` if it was already gone.
    pub fn despawn(&self, entity: EntityRef) -> bool {
        let Some(archetype) = self.archetype_of(entity) else {
            return false;
        };
        for system in self.systems.ref_systems() {
            if !system.query().matches(|ty| archetype.contains(&ty)) {
                continue;
            }
            let mut buffer = self.buffer();
            system.on_entity_removed(entity, RemoveReason::Despawn, self, &mut buffer);
            self.flush(buffer, 1);
        }

        let mut state = self.lock();
        let freed = match state.slot_mut(entity) {
            Some(slot) => {
                slot.alive = false;
                slot.components.clear();
                true
            }
            None => false,
        };
        if freed {
            state.free.push(entity.index);
        }
        freed
    }

    fn archetype_of(&self, entity: EntityRef) -> Option<Archetype> {
        self.lock().slot(entity).map(Slot::archetype)
    }

    /// Every live entity matching `query`, in slot order.
    pub fn matching(&self, query: &Query) -> Vec<EntityRef> {
        let state = self.lock();
        state
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| {
                slot.alive && query.matches(|ty| slot.components.contains_key(&ty))
            })
            .map(|(index, slot)| EntityRef::new(self.id, index as u32, slot.generation))
            .collect()
    }

    /// Number of live entities.
    pub fn alive_count(&self) -> usize {
        self.lock().slots.iter().filter(|slot| slot.alive).count()
    }

    /// Number of committed writes, buffered or direct.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Acquire)
    }

    /// Number of remove-then-put pairs committed in one batch, which makes
    /// clients rebuild the component.
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds.load(Ordering::Acquire)
    }

    /// Makes every read and write fail with a transient store error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Release);
    }

    /// Makes direct writes and removals fail while reads keep working.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::Release);
    }

    /// The UI-component ids installed on `entity`.
    pub fn ui_ids(&self, entity: EntityRef) -> Option<Vec<UiComponentId>> {
        self.get::<UiComponentList>(entity)
            .ok()
            .flatten()
            .and_then(|list| list.component_ids)
    }

    /// The nameplate text of `entity`, `None` if it has no nameplate.
    pub fn nameplate_text(&self, entity: EntityRef) -> Option<String> {
        self.get::<Nameplate>(entity)
            .ok()
            .flatten()
            .map(|nameplate| nameplate.text)
    }

    /// Returns `true` if `entity` carries `ty`.
    pub fn has(&self, entity: EntityRef, ty: ComponentType) -> bool {
        self.lock()
            .slot(entity)
            .is_some_and(|slot| slot.components.contains_key(&ty))
    }

    fn flush(&self, buffer: MemoryBuffer, depth: usize) {
        if buffer.is_empty() {
            return;
        }
        if depth > MAX_DISPATCH_DEPTH {
            log::warn!(
                "{} Dropping {} buffered writes: systems keep rewriting each other",
                LOG_PREFIX,
                buffer.len()
            );
            return;
        }
        let events = self.commit(buffer.writes);
        self.dispatch(events, depth);
    }

    fn commit(&self, writes: Vec<(EntityRef, Write)>) -> Events {
        let mut events = Events::default();
        let mut state = self.lock();
        let mut touched: Vec<(EntityRef, ComponentType)> = Vec::new();
        let mut present_before: HashMap<(EntityRef, ComponentType), bool> = HashMap::new();
        let mut archetypes_before: Vec<(EntityRef, Archetype)> = Vec::new();
        let mut removed: HashSet<(EntityRef, ComponentType)> = HashSet::new();

        for (entity, write) in writes {
            let Some(slot) = state.slot_mut(entity) else {
                continue;
            };
            let ty = write.component_type();
            if !archetypes_before.iter().any(|(e, _)| *e == entity) {
                archetypes_before.push((entity, slot.archetype()));
            }
            if let Entry::Vacant(vacant) = present_before.entry((entity, ty)) {
                vacant.insert(slot.components.contains_key(&ty));
                touched.push((entity, ty));
            }
            match write {
                Write::Put(value) => {
                    if removed.remove(&(entity, ty)) {
                        self.rebuilds.fetch_add(1, Ordering::AcqRel);
                    }
                    slot.components.insert(ty, Some(value));
                }
                Write::Remove(_) => {
                    if slot.components.remove(&ty).is_some() {
                        removed.insert((entity, ty));
                    }
                }
            }
            self.writes.fetch_add(1, Ordering::AcqRel);
        }

        for (entity, ty) in touched {
            let before = present_before.get(&(entity, ty)).copied().unwrap_or(false);
            let after = state
                .slot(entity)
                .is_some_and(|slot| slot.components.contains_key(&ty));
            let change = match (before, after) {
                (false, true) => Change::Added,
                (true, true) => Change::Set,
                (true, false) => Change::Removed,
                (false, false) => continue,
            };
            events.changes.push(ChangeEvent { entity, ty, change });
        }
        for (entity, before) in archetypes_before {
            let after = state.slot(entity).map(Slot::archetype).unwrap_or_default();
            if after != before {
                events.archetypes.push(ArchetypeEvent {
                    entity,
                    before,
                    after,
                });
            }
        }
        events
    }

    fn dispatch(&self, events: Events, depth: usize) {
        for event in events.changes {
            let Some(mut archetype) = self.archetype_of(event.entity) else {
                continue;
            };
            if event.change == Change::Removed {
                archetype.insert(event.ty);
            }
            for system in self.systems.change_systems() {
                if system.component_type() != event.ty
                    || !system.query().matches(|ty| archetype.contains(&ty))
                {
                    continue;
                }
                let mut buffer = self.buffer();
                match event.change {
                    Change::Added => system.on_component_added(event.entity, self, &mut buffer),
                    Change::Set => system.on_component_set(event.entity, self, &mut buffer),
                    Change::Removed => system.on_component_removed(event.entity, self, &mut buffer),
                }
                self.flush(buffer, depth + 1);
            }
        }

        for event in events.archetypes {
            for system in self.systems.ref_systems() {
                let query = system.query();
                let was = query.matches(|ty| event.before.contains(&ty));
                let is = query.matches(|ty| event.after.contains(&ty));
                let mut buffer = self.buffer();
                match (was, is) {
                    (false, true) => system.on_entity_added(
                        event.entity,
                        AddReason::Archetype,
                        self,
                        &mut buffer,
                    ),
                    (true, false) => system.on_entity_removed(
                        event.entity,
                        RemoveReason::Archetype,
                        self,
                        &mut buffer,
                    ),
                    _ => continue,
                }
                self.flush(buffer, depth + 1);
            }
        }
    }
}

impl EntityStore for MemoryStore {
    fn id(&self) -> StoreId {
        self.id
    }

    fn is_valid(&self, entity: EntityRef) -> bool {
        self.lock().slot(entity).is_some()
    }

    fn has_component(&self, entity: EntityRef, ty: ComponentType) -> Result<bool, HostError> {
        self.check()?;
        self.lock()
            .slot(entity)
            .map(|slot| slot.components.contains_key(&ty))
            .ok_or(HostError::InvalidReference)
    }

    fn component(
        &self,
        entity: EntityRef,
        ty: ComponentType,
    ) -> Result<Option<ComponentValue>, HostError> {
        self.check()?;
        let state = self.lock();
        let slot = state.slot(entity).ok_or(HostError::InvalidReference)?;
        Ok(slot.components.get(&ty).cloned().flatten())
    }

    fn put_component(&self, entity: EntityRef, value: ComponentValue) -> Result<(), HostError> {
        self.check_write()?;
        if !self.is_valid(entity) {
            return Err(HostError::InvalidReference);
        }
        let events = self.commit(vec![(entity, Write::Put(value))]);
        self.dispatch(events, 0);
        Ok(())
    }

    fn remove_component(&self, entity: EntityRef, ty: ComponentType) -> Result<(), HostError> {
        if !self.features.store_remove {
            return Err(HostError::Unsupported("Store::removeComponent"));
        }
        self.check_write()?;
        if !self.is_valid(entity) {
            return Err(HostError::InvalidReference);
        }
        let events = self.commit(vec![(entity, Write::Remove(ty))]);
        self.dispatch(events, 0);
        Ok(())
    }

    fn for_each_chunk(
        &self,
        query: &Query,
        visitor: &mut dyn FnMut(&ArchetypeChunk, &mut dyn CommandBuffer),
    ) -> Result<(), HostError> {
        self.check()?;
        let entities = self.matching(query);
        for rows in entities.chunks(CHUNK_CAPACITY) {
            let chunk = ArchetypeChunk::new(rows.to_vec());
            let mut buffer = self.buffer();
            visitor(&chunk, &mut buffer);
            self.flush(buffer, 0);
        }
        Ok(())
    }
}
