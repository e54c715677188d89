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

//! Shared fixture: an in-memory server running the plugin against a temporary
//! configuration directory.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use shroud_control::{ConfigManager, HideSettingsPlugin, PluginOptions};
use shroud_core::host::UiAssetPacket;
use shroud_core::{HideConfig, ADMIN_PERMISSION};
use shroud_infra::{MemorySender, MemoryServer, ServerOptions};
use tempfile::TempDir;

/// A piece the classifier knows nothing about.
pub const OTHER: u32 = 10;
/// The health bar.
pub const HEALTH: u32 = 22;
/// Floating combat text.
pub const COMBAT: u32 = 37;

/// A server with the health and combat-text assets registered.
pub fn server(options: ServerOptions) -> Arc<MemoryServer> {
    let server = MemoryServer::with_options(options);
    server
        .assets()
        .set(HEALTH, UiAssetPacket::entity_stat(MemoryServer::HEALTH_STAT_INDEX));
    server.assets().set(COMBAT, UiAssetPacket::combat_text());
    server
}

/// Path of the configuration file inside `dir`.
pub fn config_path(dir: &TempDir) -> PathBuf {
    dir.path().join("mods/ServerHideSettings/config.json")
}

/// A temporary directory, holding `config` when given.
pub fn config_dir(config: Option<&HideConfig>) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    if let Some(config) = config {
        ConfigManager::new(config_path(&dir)).save(config).unwrap();
    }
    dir
}

/// The default configuration with `change` applied.
pub fn config(change: impl FnOnce(&mut HideConfig)) -> HideConfig {
    let mut config = HideConfig::default();
    change(&mut config);
    config
}

/// A player holding the admin permission.
pub fn admin() -> MemorySender {
    MemorySender::player("Admin").with_permission(ADMIN_PERMISSION)
}

pub struct Fixture {
    pub dir: TempDir,
    pub server: Arc<MemoryServer>,
    pub plugin: Arc<HideSettingsPlugin>,
}

impl Fixture {
    /// Sets up and starts the plugin on `server`.
    pub fn start(server: Arc<MemoryServer>, dir: TempDir) -> Self {
        let plugin =
            HideSettingsPlugin::setup(server.clone(), PluginOptions::with_config_path(config_path(&dir)))
                .unwrap();
        plugin.start();
        Self {
            dir,
            server,
            plugin,
        }
    }

    /// A default server with `config` on disk.
    pub fn with_config(config: HideConfig) -> Self {
        Self::start(server(ServerOptions::default()), config_dir(Some(&config)))
    }

    /// The configuration file as currently stored.
    pub fn saved_config(&self) -> HideConfig {
        ConfigManager::new(config_path(&self.dir))
            .read()
            .unwrap()
            .expect("config file exists")
    }

    /// Overwrites the configuration file.
    pub fn write_config(&self, config: &HideConfig) {
        ConfigManager::new(config_path(&self.dir)).save(config).unwrap();
    }
}
