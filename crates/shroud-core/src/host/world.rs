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

//! Worlds, their execution contexts and entity enumeration.

use std::sync::Arc;

use super::map::WorldMapManager;
use super::store::{EntityHandle, EntityStore};
use crate::ecs::WorldId;
use crate::HostError;

/// A unit of work posted to a world's execution context.
pub type WorldTask = Box<dyn FnOnce() + Send + 'static>;

/// A world's single-writer execution context.
pub trait WorldExecutor: Send + Sync {
    /// Queues `task` on the world thread.
    fn execute(&self, task: WorldTask) -> Result<(), HostError>;
}

/// A loaded world.
pub trait HostWorld: Send + Sync {
    /// Identity of the world.
    fn id(&self) -> WorldId;

    /// Display name, for logs.
    fn name(&self) -> String;

    /// The world's execution context.
    fn executor(&self) -> Result<Arc<dyn WorldExecutor>, HostError>;

    /// The world's entity store, when this revision exposes it.
    fn entity_store(&self) -> Result<Arc<dyn EntityStore>, HostError>;

    /// Every connected player in this world.
    fn player_refs(&self) -> Result<Vec<PlayerRef>, HostError>;

    /// Every NPC in this world. `Unsupported` on revisions without enumeration.
    fn npc_refs(&self) -> Result<Vec<NpcRef>, HostError>;

    /// The world map manager.
    fn map_manager(&self) -> Result<Arc<dyn WorldMapManager>, HostError>;
}

/// A connected player, as listed by the world.
#[derive(Debug, Clone)]
pub struct PlayerRef {
    /// Player name.
    pub name: String,
    reference: Option<EntityHandle>,
}

impl PlayerRef {
    /// Creates a player reference. `reference` is `None` while the player has no
    /// entity yet (joining, respawning).
    pub fn new(name: impl Into<String>, reference: Option<EntityHandle>) -> Self {
        Self {
            name: name.into(),
            reference,
        }
    }

    /// The player's entity, if it currently has one.
    pub fn reference(&self) -> Option<&EntityHandle> {
        self.reference.as_ref()
    }
}

/// An NPC as listed by the world: either a bare entity or a wrapper that
/// exposes one.
#[derive(Debug, Clone)]
pub enum NpcRef {
    /// The entity itself.
    Entity(EntityHandle),
    /// A wrapper object; the reference may be missing.
    Wrapper {
        /// The wrapped entity.
        reference: Option<EntityHandle>,
    },
}

impl NpcRef {
    /// The NPC's entity, if any.
    pub fn reference(&self) -> Option<&EntityHandle> {
        match self {
            NpcRef::Entity(handle) => Some(handle),
            NpcRef::Wrapper { reference } => reference.as_ref(),
        }
    }
}
