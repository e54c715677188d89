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

//! The in-memory server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

use shroud_core::ecs::{StoreId, WorldId};
use shroud_core::host::{
    CommandHandler, CommandSender, HostFeature, HostFeatures, HostWorld, RefChangeSystem,
    RefSystem, ServerHost, UiAssetTable, WorldListener,
};
use shroud_core::HostError;

use crate::assets::MemoryAssets;
use crate::executor::{InlineExecutor, ThreadExecutor};
use crate::map::{MapApi, MemoryMapManager};
use crate::store::{MemoryStore, SystemRegistry};
use crate::world::{MemoryWorld, WorldExecutorKind};

/// How world tasks are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorMode {
    /// On the caller's thread.
    Inline,
    /// On one dedicated thread per world.
    Threaded,
}

/// Construction options.
#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// Optional APIs this server exposes.
    pub features: HostFeatures,
    /// World execution model.
    pub executors: ExecutorMode,
    /// Map manager API surface.
    pub map_api: MapApi,
    /// Initial size of the UI asset table.
    pub asset_count: u32,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            features: HostFeatures::CURRENT,
            executors: ExecutorMode::Inline,
            map_api: MapApi::Methods,
            asset_count: MemoryServer::DEFAULT_ASSET_COUNT,
        }
    }
}

type SharedListener = Arc<dyn Fn(Arc<dyn HostWorld>) + Send + Sync>;

/// A whole server: worlds, assets, registered systems and commands.
pub struct MemoryServer {
    options: ServerOptions,
    assets: Arc<MemoryAssets>,
    systems: Arc<SystemRegistry>,
    worlds: RwLock<Vec<Arc<MemoryWorld>>>,
    commands: RwLock<HashMap<String, Arc<dyn CommandHandler>>>,
    listeners: RwLock<Vec<SharedListener>>,
    next_world: AtomicU32,
}

impl MemoryServer {
    /// Stat index of health among the entity stats.
    pub const HEALTH_STAT_INDEX: i32 = 0;

    /// Default size of the UI asset table.
    pub const DEFAULT_ASSET_COUNT: u32 = 64;

    /// A server exposing `features`, with inline executors.
    pub fn new(features: HostFeatures) -> Arc<Self> {
        Self::with_options(ServerOptions {
            features,
            ..ServerOptions::default()
        })
    }

    /// A server built from `options`.
    pub fn with_options(options: ServerOptions) -> Arc<Self> {
        Arc::new(Self {
            options,
            assets: Arc::new(MemoryAssets::new(options.asset_count)),
            systems: Arc::new(SystemRegistry::new()),
            worlds: RwLock::new(Vec::new()),
            commands: RwLock::new(HashMap::new()),
            listeners: RwLock::new(Vec::new()),
            next_world: AtomicU32::new(1),
        })
    }

    /// The UI asset table.
    pub fn assets(&self) -> &Arc<MemoryAssets> {
        &self.assets
    }

    /// The registered systems.
    pub fn systems(&self) -> &Arc<SystemRegistry> {
        &self.systems
    }

    /// Loads a new world and notifies world listeners.
    pub fn add_world(&self, name: &str) -> std::io::Result<Arc<MemoryWorld>> {
        let id = self.next_world.fetch_add(1, Ordering::AcqRel);
        let features = self.options.features;
        let store = Arc::new(MemoryStore::new(
            StoreId(1000 + id),
            features,
            Arc::clone(&self.systems),
        ));
        let executor = match self.options.executors {
            ExecutorMode::Inline => WorldExecutorKind::Inline(Arc::new(InlineExecutor::new())),
            ExecutorMode::Threaded => WorldExecutorKind::Thread(Arc::new(ThreadExecutor::spawn(name)?)),
        };
        let world = Arc::new(MemoryWorld::new(
            WorldId(id),
            name.to_owned(),
            features,
            store,
            executor,
            Arc::new(MemoryMapManager::new(self.options.map_api)),
        ));
        self.worlds
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::clone(&world));
        log::info!("World '{}' loaded (id={})", name, id);

        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let loaded: Arc<dyn HostWorld> = world.clone();
        for listener in listeners {
            listener(Arc::clone(&loaded));
        }
        Ok(world)
    }

    /// The world named `name`.
    pub fn world(&self, name: &str) -> Option<Arc<MemoryWorld>> {
        self.worlds
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|world| world.name() == name)
            .cloned()
    }

    /// Waits until every world thread is idle.
    pub fn sync(&self) {
        for world in self.worlds.read().unwrap_or_else(|e| e.into_inner()).iter() {
            world.sync();
        }
    }

    /// Runs a chat command line such as `/hid info`. Returns `false` if no
    /// command matches.
    pub fn dispatch_command(&self, sender: &dyn CommandSender, line: &str) -> bool {
        let mut words = line.trim().trim_start_matches('/').split_whitespace();
        let Some(root) = words.next() else {
            return false;
        };
        let args: Vec<&str> = words.collect();
        let command = self
            .commands
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&root.to_ascii_lowercase())
            .cloned();
        match command {
            Some(command) => {
                command.execute(sender, &args);
                true
            }
            None => false,
        }
    }

    /// Names of the registered root commands.
    pub fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl ServerHost for MemoryServer {
    fn worlds(&self) -> Vec<Arc<dyn HostWorld>> {
        self.worlds
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|world| Arc::clone(world) as Arc<dyn HostWorld>)
            .collect()
    }

    fn ui_assets(&self) -> Result<Arc<dyn UiAssetTable>, HostError> {
        Ok(self.assets.clone())
    }

    fn health_stat_index(&self) -> Result<i32, HostError> {
        Ok(Self::HEALTH_STAT_INDEX)
    }

    fn probe(&self, feature: HostFeature) -> bool {
        self.options.features.has(feature)
    }

    fn register_ref_system(&self, system: Arc<dyn RefSystem>) -> Result<(), HostError> {
        self.systems.add_ref_system(system);
        Ok(())
    }

    fn register_change_system(&self, system: Arc<dyn RefChangeSystem>) -> Result<(), HostError> {
        self.systems.add_change_system(system);
        Ok(())
    }

    fn register_command(&self, command: Arc<dyn CommandHandler>) -> Result<(), HostError> {
        let name = command.name().to_ascii_lowercase();
        self.commands
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name, command);
        Ok(())
    }

    fn on_world_added(&self, listener: WorldListener) -> Result<(), HostError> {
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::from(listener));
        Ok(())
    }
}
