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

//! Shared fixture: an in-memory server with the engine and its systems installed.

#![allow(dead_code)]

use std::sync::Arc;

use shroud_agents::{
    Engine, EngineSlot, NameplateChangeSystem, NameplateLifecycleSystem, ProbedCompat,
    RefreshCoordinator, UiListChangeSystem, UiListLifecycleSystem,
};
use shroud_core::host::{HostCompat, ServerHost, UiAssetPacket};
use shroud_core::HideConfig;
use shroud_data::ConfigRegistry;
use shroud_infra::{MemoryServer, ServerOptions};

/// A piece the classifier knows nothing about.
pub const OTHER: u32 = 10;
/// The health bar.
pub const HEALTH: u32 = 22;
/// Floating combat text.
pub const COMBAT: u32 = 37;

pub struct Harness {
    pub server: Arc<MemoryServer>,
    pub config: Arc<ConfigRegistry>,
    pub engine: Arc<Engine>,
    pub slot: Arc<EngineSlot>,
    pub coordinator: Arc<RefreshCoordinator>,
}

impl Harness {
    pub fn new(options: ServerOptions, config: HideConfig) -> Self {
        let server = MemoryServer::with_options(options);
        server
            .assets()
            .set(HEALTH, UiAssetPacket::entity_stat(MemoryServer::HEALTH_STAT_INDEX));
        server.assets().set(COMBAT, UiAssetPacket::combat_text());

        let compat: Arc<dyn HostCompat> = Arc::new(ProbedCompat::probe(server.as_ref()));
        let config = Arc::new(ConfigRegistry::new(config));
        let host: Arc<dyn ServerHost> = server.clone();
        let engine = Arc::new(Engine::new(host, compat, Arc::clone(&config)));
        let slot = Arc::new(EngineSlot::new());
        slot.install(Arc::clone(&engine));

        server
            .register_ref_system(Arc::new(UiListLifecycleSystem::new(Arc::clone(&slot))))
            .unwrap();
        server
            .register_change_system(Arc::new(UiListChangeSystem::new(Arc::clone(&slot))))
            .unwrap();
        server
            .register_ref_system(Arc::new(NameplateLifecycleSystem::new(Arc::clone(&slot))))
            .unwrap();
        server
            .register_change_system(Arc::new(NameplateChangeSystem::new(Arc::clone(&slot))))
            .unwrap();

        let coordinator = Arc::new(RefreshCoordinator::new(Arc::clone(&engine)));
        Self {
            server,
            config,
            engine,
            slot,
            coordinator,
        }
    }

    pub fn with_config(config: HideConfig) -> Self {
        Self::new(ServerOptions::default(), config)
    }

    /// Publishes a modified copy of the current configuration.
    pub fn publish(&self, change: impl FnOnce(&mut HideConfig)) {
        let mut config = (*self.config.current()).clone();
        change(&mut config);
        self.config.publish(config);
    }
}

/// The default configuration with `change` applied.
pub fn config(change: impl FnOnce(&mut HideConfig)) -> HideConfig {
    let mut config = HideConfig::default();
    change(&mut config);
    config
}

/// A configuration that hides nothing at all.
pub fn hide_nothing() -> HideConfig {
    config(|c| {
        c.players.hide_health_bar = false;
        c.npcs.hide_health_bar = false;
    })
}
