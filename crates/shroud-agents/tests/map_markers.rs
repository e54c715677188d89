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


mod common;

use std::sync::Arc;

use common::config;
use shroud_agents::{MapMarkerController, ProbedCompat};
use shroud_core::host::map::PLAYER_ICONS_KEY;
use shroud_core::host::{HostFeatures, HostWorld, WorldMapManager};
use shroud_core::HideConfig;
use shroud_infra::{MapApi, MemoryServer, ServerOptions};

fn server(map_api: MapApi) -> Arc<MemoryServer> {
    MemoryServer::with_options(ServerOptions {
        map_api,
        ..ServerOptions::default()
    })
}

fn controller() -> MapMarkerController {
    MapMarkerController::new(Arc::new(ProbedCompat::new(HostFeatures::CURRENT)))
}

fn hidden() -> HideConfig {
    config(|c| c.map.hide_player_markers = true)
}

#[test]
fn test_hide_then_restore_original_provider() {
    for api in [MapApi::Methods, MapApi::NoRemover, MapApi::TableOnly] {
        // --- 1. ARRANGE ---
        let server = server(api);
        let world = server.add_world("overworld").unwrap();
        let controller = controller();

        // --- 2. ACT ---
        controller.apply_to_all(server.as_ref(), &hidden());
        let while_hidden = world.map().installed_name(PLAYER_ICONS_KEY);
        controller.apply_to_all(server.as_ref(), &HideConfig::default());

        // --- 3. ASSERT ---
        assert_eq!(while_hidden.as_deref(), Some("NoopPlayerIcons"), "{:?}", api);
        assert_eq!(
            world.map().installed_name(PLAYER_ICONS_KEY).as_deref(),
            Some("PlayerIconsProvider"),
            "{:?}",
            api
        );
        assert!(controller.has_captured(world.id()));
    }
}

#[test]
fn test_absent_original_is_removed_on_restore() {
    // --- 1. ARRANGE ---
    let server = server(MapApi::Methods);
    let world = server.add_world("overworld").unwrap();
    world.map().remove_provider(PLAYER_ICONS_KEY).unwrap();
    let controller = controller();

    // --- 2. ACT ---
    controller.apply_to_all(server.as_ref(), &hidden());
    assert!(world.map().installed(PLAYER_ICONS_KEY).is_some());
    controller.restore_all(server.as_ref());

    // --- 3. ASSERT ---
    assert!(world.map().installed(PLAYER_ICONS_KEY).is_none());
}

#[test]
fn test_restore_leaves_untouched_worlds_alone() {
    // --- 1. ARRANGE ---
    let server = server(MapApi::Methods);
    let world = server.add_world("overworld").unwrap();
    let controller = controller();

    // --- 2. ACT ---
    controller.restore_all(server.as_ref());
    controller.apply_to_all(server.as_ref(), &HideConfig::default());

    // --- 3. ASSERT ---
    assert!(!controller.has_captured(world.id()));
    assert_eq!(
        world.map().installed_name(PLAYER_ICONS_KEY).as_deref(),
        Some("PlayerIconsProvider")
    );
}

#[test]
fn test_global_switch_wins_over_map_flag() {
    // --- 1. ARRANGE ---
    let server = server(MapApi::Methods);
    let world = server.add_world("overworld").unwrap();
    let controller = controller();
    let cfg = config(|c| {
        c.enabled = false;
        c.map.hide_player_markers = true;
    });

    // --- 2. ACT ---
    controller.apply_to_all(server.as_ref(), &cfg);

    // --- 3. ASSERT ---
    assert_eq!(
        world.map().installed_name(PLAYER_ICONS_KEY).as_deref(),
        Some("PlayerIconsProvider")
    );
}

#[test]
fn test_unreachable_provider_table_disables_feature() {
    // --- 1. ARRANGE ---
    let server = server(MapApi::None);
    let world = server.add_world("overworld").unwrap();
    let controller = controller();

    // --- 2. ACT ---
    controller.apply_to_all(server.as_ref(), &hidden());

    // --- 3. ASSERT ---
    assert!(!controller.has_captured(world.id()));
    assert_eq!(
        world.map().installed_name(PLAYER_ICONS_KEY).as_deref(),
        Some("PlayerIconsProvider")
    );
}

#[test]
fn test_world_loaded_later_gets_current_state() {
    // --- 1. ARRANGE ---
    let server = server(MapApi::Methods);
    let controller = controller();
    controller.apply_to_all(server.as_ref(), &hidden());

    // --- 2. ACT ---
    let world = server.add_world("late").unwrap();
    let host_world: Arc<dyn HostWorld> = world.clone();
    controller.apply_to_world(&host_world, &hidden());

    // --- 3. ASSERT ---
    assert_eq!(
        world.map().installed_name(PLAYER_ICONS_KEY).as_deref(),
        Some("NoopPlayerIcons")
    );
}
