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

//! Classification of UI-component ids.
//!
//! The host does not say which overhead pieces are health bars and which are
//! damage numbers. Both facts live in its UI-component asset table, which is
//! scanned once into two flat lookup tables indexed by id.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use shroud_core::diagnostics::WarnOnce;
use shroud_core::ecs::UiComponentId;
use shroud_core::host::{EntityUiType, ServerHost};
use shroud_core::{HostError, LOG_PREFIX};

#[derive(Debug, Default)]
struct Tables {
    health: Vec<bool>,
    combat: Vec<bool>,
}

impl Tables {
    fn ids(flags: &[bool]) -> Vec<UiComponentId> {
        flags
            .iter()
            .enumerate()
            .filter(|(_, set)| **set)
            .map(|(id, _)| id as UiComponentId)
            .collect()
    }
}

/// Lazily built membership tests over the host's UI-component assets.
///
/// Readiness is one-shot but invalidated whenever a lookup falls outside the
/// current table, which happens when the host registers assets at runtime.
#[derive(Debug, Default)]
pub struct AssetClassifier {
    tables: RwLock<Arc<Tables>>,
    ready: AtomicBool,
    build_failed: WarnOnce,
}

impl AssetClassifier {
    /// Creates an unbuilt classifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the tables if needed. Returns `false` if they are unavailable, in
    /// which case callers must not write anything this tick.
    pub fn ensure_ready(&self, host: &dyn ServerHost) -> bool {
        if self.ready.load(Ordering::Acquire) {
            return true;
        }
        match Self::build(host) {
            Ok(tables) => {
                log::info!(
                    "{} UI component cache ready (health={}, combat={})",
                    LOG_PREFIX,
                    tables.health.iter().filter(|set| **set).count(),
                    tables.combat.iter().filter(|set| **set).count(),
                );
                *self.tables.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(tables);
                self.ready.store(true, Ordering::Release);
                true
            }
            Err(err) => {
                self.build_failed
                    .warn(|| format!("UI component cache unavailable: {err}"));
                log::debug!("{} UI component cache build failed: {}", LOG_PREFIX, err);
                false
            }
        }
    }

    fn build(host: &dyn ServerHost) -> Result<Tables, HostError> {
        let assets = host.ui_assets()?;
        let health_index = host.health_stat_index()?;
        let len = assets.next_index() as usize;
        let mut tables = Tables {
            health: vec![false; len],
            combat: vec![false; len],
        };
        for id in 0..len {
            let Some(packet) = assets.packet(id as UiComponentId)? else {
                continue;
            };
            match packet.kind {
                EntityUiType::CombatText => tables.combat[id] = true,
                EntityUiType::EntityStat if packet.entity_stat_index == health_index => {
                    tables.health[id] = true
                }
                _ => {}
            }
        }
        Ok(tables)
    }

    fn snapshot(&self) -> Arc<Tables> {
        Arc::clone(&self.tables.read().unwrap_or_else(|e| e.into_inner()))
    }

    fn lookup(&self, id: UiComponentId, select: impl Fn(&Tables) -> &[bool]) -> bool {
        let tables = self.snapshot();
        match select(tables.as_ref()).get(id as usize) {
            Some(set) => *set,
            None => {
                self.ready.store(false, Ordering::Release);
                false
            }
        }
    }

    /// Returns `true` if `id` is a health-stat overhead piece.
    pub fn is_health_stat(&self, id: UiComponentId) -> bool {
        self.lookup(id, |tables| tables.health.as_slice())
    }

    /// Returns `true` if `id` is a combat-text overhead piece.
    pub fn is_combat_text(&self, id: UiComponentId) -> bool {
        self.lookup(id, |tables| tables.combat.as_slice())
    }

    /// Returns `true` if the tables are built and current.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Forces a rebuild on the next [`ensure_ready`](Self::ensure_ready).
    pub fn reset(&self) {
        self.ready.store(false, Ordering::Release);
    }

    /// Sorted health-stat ids of the current tables.
    pub fn health_stat_ids(&self) -> Vec<UiComponentId> {
        Tables::ids(&self.snapshot().health)
    }

    /// Sorted combat-text ids of the current tables.
    pub fn combat_text_ids(&self) -> Vec<UiComponentId> {
        Tables::ids(&self.snapshot().combat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shroud_core::host::{HostFeatures, UiAssetPacket, UiAssetTable};
    use shroud_infra::MemoryServer;

    fn server() -> Arc<MemoryServer> {
        let server = MemoryServer::new(HostFeatures::CURRENT);
        server
            .assets()
            .set(22, UiAssetPacket::entity_stat(MemoryServer::HEALTH_STAT_INDEX));
        server.assets().set(23, UiAssetPacket::entity_stat(MemoryServer::HEALTH_STAT_INDEX + 1));
        server.assets().set(37, UiAssetPacket::combat_text());
        server
    }

    #[test]
    fn test_classifies_health_and_combat_ids() {
        let server = server();
        let classifier = AssetClassifier::new();
        assert!(classifier.ensure_ready(server.as_ref()));
        assert!(classifier.is_health_stat(22));
        assert!(!classifier.is_health_stat(23), "stamina bar is not a health bar");
        assert!(classifier.is_combat_text(37));
        assert!(!classifier.is_combat_text(10));
        assert_eq!(classifier.health_stat_ids(), vec![22]);
        assert_eq!(classifier.combat_text_ids(), vec![37]);
    }

    #[test]
    fn test_out_of_range_lookup_invalidates() {
        let server = server();
        let classifier = AssetClassifier::new();
        assert!(classifier.ensure_ready(server.as_ref()));

        let beyond = server.assets().next_index() + 5;
        assert!(!classifier.is_combat_text(beyond));
        assert!(!classifier.is_ready());

        server.assets().set(beyond, UiAssetPacket::combat_text());
        assert!(classifier.ensure_ready(server.as_ref()));
        assert!(classifier.is_combat_text(beyond), "rebuild picks up new assets");
    }

    #[test]
    fn test_reset_then_rebuild_gives_same_answers() {
        let server = server();
        let classifier = AssetClassifier::new();
        assert!(classifier.ensure_ready(server.as_ref()));
        let before: Vec<_> = (0..40).map(|id| classifier.is_health_stat(id)).collect();

        classifier.reset();
        assert!(classifier.ensure_ready(server.as_ref()));
        let after: Vec<_> = (0..40).map(|id| classifier.is_health_stat(id)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_build_failure_reports_not_ready() {
        let server = server();
        server.assets().set_failing(true);
        let classifier = AssetClassifier::new();
        assert!(!classifier.ensure_ready(server.as_ref()));
        assert!(!classifier.is_health_stat(22));

        server.assets().set_failing(false);
        assert!(classifier.ensure_ready(server.as_ref()));
    }
}
