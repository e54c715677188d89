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

//! Loaded worlds.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use shroud_core::ecs::{
    ComponentType, ComponentValue, EntityRef, Nameplate, Query, UiComponentId, UiComponentList,
    WorldId,
};
use shroud_core::host::{
    EntityHandle, EntityStore, HostFeatures, HostWorld, NpcRef, PlayerRef, WorldExecutor,
    WorldMapManager,
};
use shroud_core::HostError;

use crate::executor::{InlineExecutor, ThreadExecutor};
use crate::map::MemoryMapManager;
use crate::store::MemoryStore;

pub(crate) enum WorldExecutorKind {
    Inline(Arc<InlineExecutor>),
    Thread(Arc<ThreadExecutor>),
}

/// A world with one store, one executor and one map manager.
pub struct MemoryWorld {
    id: WorldId,
    name: String,
    features: HostFeatures,
    store: Arc<MemoryStore>,
    executor: WorldExecutorKind,
    map: Arc<MemoryMapManager>,
    players: RwLock<Vec<(String, EntityRef)>>,
    players_failing: AtomicBool,
}

impl MemoryWorld {
    pub(crate) fn new(
        id: WorldId,
        name: String,
        features: HostFeatures,
        store: Arc<MemoryStore>,
        executor: WorldExecutorKind,
        map: Arc<MemoryMapManager>,
    ) -> Self {
        Self {
            id,
            name,
            features,
            store,
            executor,
            map,
            players: RwLock::new(Vec::new()),
            players_failing: AtomicBool::new(false),
        }
    }

    /// The world's store.
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// The world's map manager.
    pub fn map(&self) -> &Arc<MemoryMapManager> {
        &self.map
    }

    /// Spawns a connected player with the given overhead pieces and nameplate.
    pub fn spawn_player(
        &self,
        name: &str,
        ui_ids: &[UiComponentId],
        nameplate: Option<&str>,
    ) -> EntityRef {
        let mut values: Vec<ComponentValue> = vec![UiComponentList::new(ui_ids).into()];
        if let Some(text) = nameplate {
            values.push(Nameplate::new(text).into());
        }
        let entity = self.store.spawn(values, &[ComponentType::Player]);
        self.players
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((name.to_owned(), entity));
        entity
    }

    /// Spawns an NPC with the given overhead pieces.
    pub fn spawn_npc(&self, ui_ids: &[UiComponentId]) -> EntityRef {
        self.store
            .spawn(vec![UiComponentList::new(ui_ids).into()], &[ComponentType::Npc])
    }

    /// Despawns an entity, disconnecting it if it was a player.
    pub fn despawn(&self, entity: EntityRef) -> bool {
        self.players
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|(_, player)| *player != entity);
        self.store.despawn(entity)
    }

    /// Makes the player listing fail, as it does while players are joining.
    pub fn set_players_failing(&self, failing: bool) {
        self.players_failing.store(failing, Ordering::Release);
    }

    /// Number of tasks the world executor has run.
    pub fn executed_tasks(&self) -> usize {
        match &self.executor {
            WorldExecutorKind::Inline(executor) => executor.executed(),
            WorldExecutorKind::Thread(executor) => executor.executed(),
        }
    }

    /// Waits until the world thread is idle. Immediate for inline worlds.
    pub fn sync(&self) -> bool {
        match &self.executor {
            WorldExecutorKind::Inline(_) => true,
            WorldExecutorKind::Thread(executor) => executor.sync(),
        }
    }

    fn handle(&self, entity: EntityRef) -> Option<EntityHandle> {
        let store: Arc<dyn EntityStore> = self.store.clone();
        store
            .is_valid(entity)
            .then(|| EntityHandle::new(entity, store))
    }
}

impl HostWorld for MemoryWorld {
    fn id(&self) -> WorldId {
        self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn executor(&self) -> Result<Arc<dyn WorldExecutor>, HostError> {
        if !self.features.world_executor {
            return Err(HostError::Unsupported("World::execute"));
        }
        let executor: Arc<dyn WorldExecutor> = match &self.executor {
            WorldExecutorKind::Inline(executor) => executor.clone(),
            WorldExecutorKind::Thread(executor) => executor.clone(),
        };
        Ok(executor)
    }

    fn entity_store(&self) -> Result<Arc<dyn EntityStore>, HostError> {
        if !self.features.world_store_access {
            return Err(HostError::Unsupported("World::getEntityStore"));
        }
        Ok(self.store.clone())
    }

    fn player_refs(&self) -> Result<Vec<PlayerRef>, HostError> {
        if self.players_failing.load(Ordering::Acquire) {
            return Err(HostError::Store("player list is being rebuilt".into()));
        }
        let players = self.players.read().unwrap_or_else(|e| e.into_inner());
        Ok(players
            .iter()
            .map(|(name, entity)| PlayerRef::new(name.clone(), self.handle(*entity)))
            .collect())
    }

    fn npc_refs(&self) -> Result<Vec<NpcRef>, HostError> {
        if !self.features.npc_enumeration {
            return Err(HostError::Unsupported("World::getNpcRefs"));
        }
        Ok(self
            .store
            .matching(&Query::with(ComponentType::Npc))
            .into_iter()
            .map(|entity| NpcRef::Wrapper {
                reference: self.handle(entity),
            })
            .collect())
    }

    fn map_manager(&self) -> Result<Arc<dyn WorldMapManager>, HostError> {
        Ok(self.map.clone())
    }
}
