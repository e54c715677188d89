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

//! Runs the plugin against a threaded in-memory server: spawns a few entities,
//! drives the `/hid` command and the dashboard, then shuts down.
//!
//! Usage: `sandbox [config-path]`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use shroud_control::{HideSettingsPlugin, PluginOptions};
use shroud_core::ecs::{ComponentType, Query};
use shroud_core::host::map::PLAYER_ICONS_KEY;
use shroud_core::host::UiAssetPacket;
use shroud_core::ADMIN_PERMISSION;
use shroud_infra::{ExecutorMode, MemorySender, MemoryServer, MemoryWorld, ServerOptions};

const NAME_TAG: u32 = 10;
const HEALTH_BAR: u32 = 22;
const DAMAGE_TEXT: u32 = 37;

fn report(world: &MemoryWorld, label: &str) {
    for entity in world.store().matching(&Query::with(ComponentType::UiComponentList)) {
        log::info!(
            "[{}] {:?}: ui={:?} nameplate={:?}",
            label,
            entity,
            world.store().ui_ids(entity).unwrap_or_default(),
            world.store().nameplate_text(entity),
        );
    }
    log::info!(
        "[{}] map provider: {:?}",
        label,
        world.map().installed_name(PLAYER_ICONS_KEY)
    );
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let options = match std::env::args().nth(1) {
        Some(path) => PluginOptions::with_config_path(PathBuf::from(path)),
        None => PluginOptions::default(),
    };

    let server = MemoryServer::with_options(ServerOptions {
        executors: ExecutorMode::Threaded,
        ..ServerOptions::default()
    });
    server
        .assets()
        .set(HEALTH_BAR, UiAssetPacket::entity_stat(MemoryServer::HEALTH_STAT_INDEX));
    server.assets().set(DAMAGE_TEXT, UiAssetPacket::combat_text());

    let world = server.add_world("overworld").context("failed to start world thread")?;
    world.spawn_player("Alice", &[NAME_TAG, HEALTH_BAR, DAMAGE_TEXT], Some("Alice"));
    world.spawn_npc(&[HEALTH_BAR, DAMAGE_TEXT]);
    report(&world, "before");

    let plugin = HideSettingsPlugin::setup(server.clone(), options)?;
    plugin.start();
    server.sync();
    report(&world, "setup");

    let admin = MemorySender::player("Admin").with_permission(ADMIN_PERMISSION);
    server.dispatch_command(&admin, "/hid info");
    server.dispatch_command(&admin, "/hid ui");
    if let Some(page) = admin.last_page() {
        for action in ["toggle_players_nameplate", "toggle_map_players", "toggle_npcs_damage"] {
            page.handle_event(&admin, action);
        }
        server.sync();
        report(&world, "dashboard");
        for action in ["toggle_players_nameplate", "toggle_map_players", "toggle_npcs_damage"] {
            page.handle_event(&admin, action);
        }
        server.sync();
    }
    for line in admin.messages() {
        log::info!("> {}", line);
    }

    plugin.shutdown();
    server.sync();
    report(&world, "shutdown");
    Ok(())
}
