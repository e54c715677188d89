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

use common::{Harness, HEALTH, OTHER};
use shroud_agents::refresh_agent::passes;
use shroud_core::ecs::{EntityRef, StoreId};
use shroud_core::host::{EntityStore, HostFeatures, HostWorld};
use shroud_core::HideConfig;
use shroud_data::{EntryKind, UiBaselineEntry};
use shroud_infra::ServerOptions;

fn stale(store: StoreId, index: u32) -> EntityRef {
    EntityRef::new(store, index, 1)
}

fn plant(harness: &Harness, entity: EntityRef, kind: EntryKind) {
    harness
        .engine
        .ui_baselines()
        .get_or_insert_with(entity.key(), || UiBaselineEntry::new(vec![OTHER, HEALTH], kind));
}

#[test]
fn test_gc_with_store_access_sweeps_both_kinds() {
    // --- 1. ARRANGE ---
    let harness = Harness::with_config(HideConfig::default());
    let world = harness.server.add_world("overworld").unwrap();
    let store_id = world.store().id();
    let player = world.spawn_player("Alice", &[OTHER, HEALTH], None);
    assert!(harness.engine.ui_baselines().get(player.key()).is_some());

    let dead_player = stale(store_id, 900);
    let dead_npc = stale(store_id, 901);
    let unknown = stale(store_id, 902);
    let other_world = stale(StoreId(7), 900);
    plant(&harness, dead_player, EntryKind::Player);
    plant(&harness, dead_npc, EntryKind::Npc);
    plant(&harness, unknown, EntryKind::Unknown);
    plant(&harness, other_world, EntryKind::Player);
    harness.engine.nameplate_baselines().get_or_create(dead_player.key());

    // --- 2. ACT ---
    let host_world: Arc<dyn HostWorld> = world.clone();
    let store = harness.engine.compat().world_store(host_world.as_ref());
    let stats = passes::baseline_gc(&harness.engine, host_world.as_ref(), store.as_ref());

    // --- 3. ASSERT ---
    let baselines = harness.engine.ui_baselines();
    assert!(baselines.get(player.key()).is_some(), "live entities keep their baseline");
    assert!(baselines.get(dead_player.key()).is_none());
    assert!(baselines.get(dead_npc.key()).is_none());
    assert!(baselines.get(unknown.key()).is_some(), "unknown kinds are never swept");
    assert!(baselines.get(other_world.key()).is_some(), "other stores are untouched");
    assert!(harness.engine.nameplate_baselines().get(dead_player.key()).is_none());
    assert_eq!(stats.stores, 1);
    assert_eq!(stats.seen_players, 1);
    assert_eq!(stats.removed, 3);
}

#[test]
fn test_gc_fallback_only_sweeps_enumerated_kinds() {
    // --- 1. ARRANGE ---
    // No store access and no NPC enumeration.
    let harness = Harness::new(
        ServerOptions {
            features: HostFeatures::LEGACY,
            ..ServerOptions::default()
        },
        HideConfig::default(),
    );
    let world = harness.server.add_world("overworld").unwrap();
    let store_id = world.store().id();
    world.spawn_player("Alice", &[OTHER], None);
    let dead_player = stale(store_id, 900);
    let dead_npc = stale(store_id, 901);
    plant(&harness, dead_player, EntryKind::Player);
    plant(&harness, dead_npc, EntryKind::Npc);

    // --- 2. ACT ---
    harness.coordinator.baseline_gc();

    // --- 3. ASSERT ---
    let baselines = harness.engine.ui_baselines();
    assert!(baselines.get(dead_player.key()).is_none());
    assert!(
        baselines.get(dead_npc.key()).is_some(),
        "NPCs were not enumerated, so their entries must survive"
    );
}

#[test]
fn test_gc_without_observed_store_does_nothing() {
    // --- 1. ARRANGE ---
    let harness = Harness::new(
        ServerOptions {
            features: HostFeatures::LEGACY,
            ..ServerOptions::default()
        },
        HideConfig::default(),
    );
    let world = harness.server.add_world("overworld").unwrap();
    let dead_player = stale(world.store().id(), 900);
    plant(&harness, dead_player, EntryKind::Player);

    // --- 2. ACT ---
    let stats = passes::baseline_gc(&harness.engine, world.as_ref(), None);

    // --- 3. ASSERT ---
    assert_eq!(stats.stores, 0);
    assert!(harness.engine.ui_baselines().get(dead_player.key()).is_some());
}

#[test]
fn test_despawn_drops_ui_baseline_but_not_nameplate_entry() {
    // --- 1. ARRANGE ---
    let harness = Harness::with_config(common::config(|c| c.players.hide_nameplate = true));
    let world = harness.server.add_world("overworld").unwrap();
    let player = world.spawn_player("Alice", &[OTHER, HEALTH], Some("Alice"));
    assert!(harness.engine.ui_baselines().get(player.key()).is_some());
    assert!(harness.engine.nameplate_baselines().get(player.key()).is_some());

    // --- 2. ACT ---
    world.despawn(player);

    // --- 3. ASSERT ---
    assert!(harness.engine.ui_baselines().get(player.key()).is_none());
    assert!(
        harness.engine.nameplate_baselines().get(player.key()).is_some(),
        "nameplate entries wait for the GC pass"
    );
    harness.coordinator.baseline_gc();
    assert!(harness.engine.nameplate_baselines().get(player.key()).is_none());
}

#[test]
fn test_gc_fallback_keeps_players_when_listing_fails() {
    // --- 1. ARRANGE ---
    // NPCs can be listed but the store cannot be walked.
    let harness = Harness::new(
        ServerOptions {
            features: HostFeatures {
                npc_enumeration: true,
                ..HostFeatures::LEGACY
            },
            ..ServerOptions::default()
        },
        common::config(|c| c.players.hide_nameplate = true),
    );
    let world = harness.server.add_world("overworld").unwrap();
    let player = world.spawn_player("Alice", &[OTHER, HEALTH], Some("Alice"));
    let npc = world.spawn_npc(&[OTHER, HEALTH]);
    let dead_npc = stale(world.store().id(), 901);
    plant(&harness, dead_npc, EntryKind::Npc);
    assert!(harness.engine.ui_baselines().get(player.key()).is_some());
    assert!(harness.engine.nameplate_baselines().get(player.key()).is_some());
    world.set_players_failing(true);

    // --- 2. ACT ---
    let stats = passes::baseline_gc(&harness.engine, world.as_ref(), None);

    // --- 3. ASSERT ---
    let baselines = harness.engine.ui_baselines();
    assert_eq!(stats.seen_players, 0);
    assert_eq!(stats.seen_npcs, 1);
    assert!(baselines.get(player.key()).is_some(), "unlisted players keep their baseline");
    assert!(harness.engine.nameplate_baselines().get(player.key()).is_some());
    assert!(baselines.get(npc.key()).is_some());
    assert!(baselines.get(dead_npc.key()).is_none(), "listed NPCs are still swept");
    assert_eq!(stats.removed, 1);
}

#[test]
fn test_gc_fallback_keeps_players_when_none_are_listed() {
    // --- 1. ARRANGE ---
    let harness = Harness::new(
        ServerOptions {
            features: HostFeatures {
                npc_enumeration: true,
                ..HostFeatures::LEGACY
            },
            ..ServerOptions::default()
        },
        HideConfig::default(),
    );
    let world = harness.server.add_world("overworld").unwrap();
    world.spawn_npc(&[OTHER, HEALTH]);
    let dead_player = stale(world.store().id(), 900);
    plant(&harness, dead_player, EntryKind::Player);

    // --- 2. ACT ---
    let stats = passes::baseline_gc(&harness.engine, world.as_ref(), None);

    // --- 3. ASSERT ---
    assert_eq!(stats.stores, 1);
    assert!(harness.engine.ui_baselines().get(dead_player.key()).is_some());
}
