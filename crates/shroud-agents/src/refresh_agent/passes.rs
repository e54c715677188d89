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

//! The passes a refresh runs on one world's execution context.
//!
//! Every pass prefers chunked iteration over the world store: it reaches every
//! entity and hands out a write batch. Hosts that do not expose the store are
//! walked through their public player and NPC listings instead, writing
//! directly to each entity's store.

use std::collections::HashSet;
use std::sync::Arc;

use shroud_core::ecs::{ComponentType, EntityKey, EntityRef, Query, StoreId};
use shroud_core::host::{ArchetypeChunk, CommandBuffer, EntityHandle, EntityStore, HostWorld};
use shroud_core::{HostError, LOG_PREFIX};
use shroud_data::SweepKinds;
use shroud_lanes::CategoryHint;

use super::stats::{GcStats, PassStats};
use super::WorkSet;
use crate::engine::Engine;

/// Counters of the player pass.
#[derive(Debug, Clone, Copy)]
pub struct PlayerPassStats {
    /// UI-list lane.
    pub ui: PassStats,
    /// Nameplate lane.
    pub nameplates: PassStats,
}

type Visitor<'a> = dyn FnMut(EntityRef, &dyn EntityStore, Option<&mut dyn CommandBuffer>) + 'a;

/// Runs every pass selected in `work` over `world`.
pub fn run(engine: &Engine, world: &dyn HostWorld, work: WorkSet) {
    let log_stats = engine.config().current().debug.log_refresh_stats;
    let name = world.name();
    let store = engine.compat().world_store(world);
    let store = store.as_ref();

    if work.contains(WorkSet::PLAYERS) {
        let force_restore = work.contains(WorkSet::RESTORE_NAMEPLATES);
        let stats = refresh_players(engine, world, store, force_restore);
        stats.ui.log(log_stats, "[Refresh]", &name, "players");
        stats
            .nameplates
            .log(log_stats, "[Nameplates][Refresh]", &name, "players");
    } else if work.contains(WorkSet::RESTORE_NAMEPLATES) {
        let stats = restore_nameplates(engine, world, store);
        stats.log(log_stats, "[Nameplates][Restore]", &name, "players");
    }
    if work.contains(WorkSet::NPCS) {
        let stats = refresh_npcs(engine, world, store);
        stats.log(log_stats, "[Refresh]", &name, "npcs");
    }
    if work.contains(WorkSet::BASELINE_GC) {
        let stats = baseline_gc(engine, world, store);
        stats.log(log_stats, &name);
    }
}

/// Applies both lanes to every player of `world`.
///
/// Batched UI writes force a client-side rebuild so players that are already
/// streamed to clients pick up the change.
pub fn refresh_players(
    engine: &Engine,
    world: &dyn HostWorld,
    store: Option<&Arc<dyn EntityStore>>,
    force_restore: bool,
) -> PlayerPassStats {
    let mut ui = PassStats::start();
    let mut nameplates = PassStats::start();
    let result = visit(
        world,
        store,
        ComponentType::Player,
        &|| player_handles(engine, world),
        &mut |entity, store, buffer| match buffer {
            Some(buffer) => {
                ui.record(engine.ui_lane().apply(
                    entity,
                    store,
                    Some(&mut *buffer),
                    CategoryHint::Player,
                    true,
                ));
                nameplates.record(engine.nameplate_lane().apply(
                    entity,
                    store,
                    Some(buffer),
                    force_restore,
                ));
            }
            None => {
                ui.record(engine.ui_lane().apply(entity, store, None, CategoryHint::Player, false));
                nameplates.record(engine.nameplate_lane().apply(entity, store, None, force_restore));
            }
        },
    );
    if let Err(err) = result {
        log::warn!(
            "{} Failed to refresh players in world {}: {}",
            LOG_PREFIX,
            world.name(),
            err
        );
    }
    PlayerPassStats { ui, nameplates }
}

/// Puts the captured nameplate back on every player of `world`.
pub fn restore_nameplates(
    engine: &Engine,
    world: &dyn HostWorld,
    store: Option<&Arc<dyn EntityStore>>,
) -> PassStats {
    let mut stats = PassStats::start();
    let result = visit(
        world,
        store,
        ComponentType::Player,
        &|| player_handles(engine, world),
        &mut |entity, store, buffer| {
            stats.record(engine.nameplate_lane().apply(entity, store, buffer, true));
        },
    );
    if let Err(err) = result {
        log::warn!(
            "{} Failed to restore nameplates in world {}: {}",
            LOG_PREFIX,
            world.name(),
            err
        );
    }
    stats
}

/// Applies the UI-list lane to every NPC of `world`.
pub fn refresh_npcs(
    engine: &Engine,
    world: &dyn HostWorld,
    store: Option<&Arc<dyn EntityStore>>,
) -> PassStats {
    let mut stats = PassStats::start();
    let result = visit(
        world,
        store,
        ComponentType::Npc,
        &|| npc_handles(engine, world),
        &mut |entity, store, buffer| {
            stats.record(engine.ui_lane().apply(entity, store, buffer, CategoryHint::Npc, false));
        },
    );
    if let Err(err) = result {
        log::debug!(
            "{} NPC refresh skipped in world {}: {}",
            LOG_PREFIX,
            world.name(),
            err
        );
    }
    stats
}

/// Removes baselines of entities that no longer exist.
///
/// Only stores the pass could observe are swept, and only entry kinds it could
/// enumerate: the world store shows both players and NPCs, while the listing
/// fallback only vouches for a kind whose listing succeeded and saw some.
/// Entries of unknown kind are never removed.
pub fn baseline_gc(
    engine: &Engine,
    world: &dyn HostWorld,
    store: Option<&Arc<dyn EntityStore>>,
) -> GcStats {
    let mut stats = GcStats::start();
    let mut alive: HashSet<EntityKey> = HashSet::new();
    let mut stores: HashSet<StoreId> = HashSet::new();
    let mut chunked = false;

    if let Some(store) = store {
        let players = collect_keys(store.as_ref(), ComponentType::Player, &mut alive);
        let npcs = collect_keys(store.as_ref(), ComponentType::Npc, &mut alive);
        match (players, npcs) {
            (Ok(players), Ok(npcs)) => {
                stats.seen_players = players;
                stats.seen_npcs = npcs;
                stores.insert(store.id());
                chunked = true;
            }
            (Err(err), _) | (_, Err(err)) => {
                log::debug!("{} GC store walk failed, using listings: {}", LOG_PREFIX, err);
                alive.clear();
            }
        }
    }

    // A kind is only swept when its listing succeeded and saw at least one
    // entity; otherwise its baselines cannot be told apart from stale ones.
    let mut kinds = SweepKinds::BOTH;
    if !chunked {
        let players = player_handles(engine, world);
        kinds.players = players.as_ref().is_some_and(|handles| !handles.is_empty());
        for handle in players.unwrap_or_default() {
            let key = handle.entity.key();
            alive.insert(key);
            stores.insert(key.store_id());
            stats.seen_players += 1;
        }
        let npcs = npc_handles(engine, world);
        kinds.npcs = npcs.as_ref().is_some_and(|handles| !handles.is_empty());
        for handle in npcs.unwrap_or_default() {
            let key = handle.entity.key();
            alive.insert(key);
            stores.insert(key.store_id());
            stats.seen_npcs += 1;
        }
    }

    if stores.is_empty() {
        return stats;
    }
    for store in &stores {
        stats.removed += engine.ui_baselines().sweep_store(*store, &alive, kinds);
        if kinds.players {
            stats.removed += engine.nameplate_baselines().sweep_store(*store, &alive);
        }
    }
    stats.stores = stores.len();
    stats
}

fn visit(
    world: &dyn HostWorld,
    store: Option<&Arc<dyn EntityStore>>,
    marker: ComponentType,
    fallback: &dyn Fn() -> Option<Vec<EntityHandle>>,
    visitor: &mut Visitor<'_>,
) -> Result<(), HostError> {
    if let Some(store) = store {
        let store: &dyn EntityStore = store.as_ref();
        return store.for_each_chunk(
            &Query::with(marker),
            &mut |chunk: &ArchetypeChunk, buffer: &mut dyn CommandBuffer| {
                for entity in chunk.references() {
                    if store.is_valid(entity) {
                        visitor(entity, store, Some(&mut *buffer));
                    }
                }
            },
        );
    }
    let Some(handles) = fallback() else {
        log::trace!("{} no {:?} listing on world {}", LOG_PREFIX, marker, world.name());
        return Ok(());
    };
    for handle in handles {
        visitor(handle.entity, handle.store.as_ref(), None);
    }
    Ok(())
}

fn player_handles(engine: &Engine, world: &dyn HostWorld) -> Option<Vec<EntityHandle>> {
    match world.player_refs() {
        Ok(players) => Some(
            players
                .iter()
                .filter_map(|player| engine.compat().player_entity(player))
                .collect(),
        ),
        Err(err) => {
            log::warn!("{} Player listing failed in world {}: {}", LOG_PREFIX, world.name(), err);
            None
        }
    }
}

fn npc_handles(engine: &Engine, world: &dyn HostWorld) -> Option<Vec<EntityHandle>> {
    let npcs = engine.compat().npc_refs(world)?;
    Some(
        npcs.iter()
            .filter_map(|npc| engine.compat().npc_entity(npc))
            .collect(),
    )
}

fn collect_keys(
    store: &dyn EntityStore,
    marker: ComponentType,
    alive: &mut HashSet<EntityKey>,
) -> Result<usize, HostError> {
    let mut seen = 0;
    store.for_each_chunk(
        &Query::with(marker),
        &mut |chunk: &ArchetypeChunk, _: &mut dyn CommandBuffer| {
            for entity in chunk.references() {
                if store.is_valid(entity) {
                    alive.insert(entity.key());
                    seen += 1;
                }
            }
        },
    )?;
    Ok(seen)
}
