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

//! The UI-component list override.
//!
//! Every filtered list is derived from the entity's baseline, never from its live
//! list. Ids that appear on the entity after the baseline was captured are
//! therefore dropped while any category is hidden, and restoring always returns
//! exactly the captured list.

use std::sync::Arc;

use shroud_core::config::TargetCategory;
use shroud_core::ecs::{ComponentType, EntityKey, EntityRef, HostComponent, UiComponentId, UiComponentList};
use shroud_core::host::{CommandBuffer, EntityStore, EntityStoreExt, HostCompat, ServerHost};
use shroud_core::{HostError, LOG_PREFIX};
use shroud_data::{AssetClassifier, ConfigRegistry, EntryKind, UiBaselineCache, UiBaselineEntry};

use super::filter;
use super::write_prep::WritePreparer;

/// How the lane decides whether an entity is a player or an NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryHint {
    /// Look at the marker components.
    Auto,
    /// The caller knows it is a player.
    Player,
    /// The caller knows it is an NPC.
    Npc,
}

/// Rewrites the UI-component list of players and NPCs.
pub struct UiListLane {
    config: Arc<ConfigRegistry>,
    baselines: Arc<UiBaselineCache>,
    classifier: Arc<AssetClassifier>,
    host: Arc<dyn ServerHost>,
    compat: Arc<dyn HostCompat>,
    writer: WritePreparer<UiComponentList>,
}

impl UiListLane {
    /// Creates the lane over the engine's shared state.
    pub fn new(
        config: Arc<ConfigRegistry>,
        baselines: Arc<UiBaselineCache>,
        classifier: Arc<AssetClassifier>,
        host: Arc<dyn ServerHost>,
        compat: Arc<dyn HostCompat>,
    ) -> Self {
        Self {
            config,
            baselines,
            classifier,
            host,
            compat,
            writer: WritePreparer::new(),
        }
    }

    /// Applies the active configuration to `entity`.
    ///
    /// Writes go through `buffer` when the caller holds one (ECS callbacks, chunk
    /// iteration) and directly to `store` otherwise. With `rebuild`, batched writes
    /// remove the component before putting it back so clients that already
    /// streamed the entity rebuild it.
    ///
    /// Returns `true` if a new list was written.
    pub fn apply(
        &self,
        entity: EntityRef,
        store: &dyn EntityStore,
        buffer: Option<&mut dyn CommandBuffer>,
        hint: CategoryHint,
        rebuild: bool,
    ) -> bool {
        if !store.is_valid(entity) {
            return false;
        }
        let list = match store.get::<UiComponentList>(entity) {
            Ok(Some(list)) => list,
            Ok(None) => return false,
            Err(err) => {
                log::trace!("{} skipping {:?}: {}", LOG_PREFIX, entity, err);
                return false;
            }
        };
        let Some(live) = list.ids() else {
            return false;
        };
        let key = entity.key();

        let config = self.config.current();
        if !config.enabled {
            return self.restore_or_drop(key, entity, store, buffer, list, rebuild);
        }

        // Without a marker only what both categories hide is removed, and the
        // baseline is tagged unknown until a later pass resolves the category.
        let category = match Self::category(entity, store, hint) {
            Ok(category) => category,
            Err(err) => {
                log::trace!("{} skipping {:?}: {}", LOG_PREFIX, entity, err);
                return false;
            }
        };
        let settings = category.map_or_else(|| config.shared_target(), |c| config.target(c));
        let kind = category.map_or(EntryKind::Unknown, EntryKind::from);
        if settings.hides_nothing() {
            return self.restore_or_drop(key, entity, store, buffer, list, rebuild);
        }

        if !self.classifier.ensure_ready(self.host.as_ref()) {
            return false;
        }

        let (baseline, created) = self.baselines.get_or_insert_with(key, || {
            UiBaselineEntry::new(filter::dedup_preserving_order(live), kind)
        });
        if !created && baseline.promote(kind) {
            log::trace!("{} baseline of {:?} tagged {:?}", LOG_PREFIX, entity, kind);
        }

        let desired = filter::desired_ids(baseline.ids(), settings, &self.classifier);
        if desired == live {
            if created {
                self.baselines.remove_if_same(key, &baseline);
            }
            return false;
        }
        self.write(entity, store, buffer, list, desired, rebuild)
    }

    /// Resolves the category of `entity`; `None` when it carries neither marker.
    fn category(
        entity: EntityRef,
        store: &dyn EntityStore,
        hint: CategoryHint,
    ) -> Result<Option<TargetCategory>, HostError> {
        match hint {
            CategoryHint::Player => Ok(Some(TargetCategory::Player)),
            CategoryHint::Npc => Ok(Some(TargetCategory::Npc)),
            CategoryHint::Auto => {
                if store.has_component(entity, ComponentType::Player)? {
                    Ok(Some(TargetCategory::Player))
                } else if store.has_component(entity, ComponentType::Npc)? {
                    Ok(Some(TargetCategory::Npc))
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Writes the baseline back if the live list differs, then forgets it.
    fn restore_or_drop(
        &self,
        key: EntityKey,
        entity: EntityRef,
        store: &dyn EntityStore,
        buffer: Option<&mut dyn CommandBuffer>,
        list: UiComponentList,
        rebuild: bool,
    ) -> bool {
        let Some(baseline) = self.baselines.get(key) else {
            return false;
        };
        if list.ids() == Some(baseline.ids()) {
            self.baselines.remove_if_same(key, &baseline);
            return false;
        }
        let restored = baseline.ids().to_vec();
        if !self.write(entity, store, buffer, list, restored, rebuild) {
            return false;
        }
        self.baselines.remove_if_same(key, &baseline);
        true
    }

    fn write(
        &self,
        entity: EntityRef,
        store: &dyn EntityStore,
        buffer: Option<&mut dyn CommandBuffer>,
        list: UiComponentList,
        ids: Vec<UiComponentId>,
        rebuild: bool,
    ) -> bool {
        match buffer {
            Some(buffer) => {
                let mut value = list;
                value.component_ids = Some(ids);
                if rebuild && self.compat.recreate_on_rewrite() {
                    self.compat
                        .remove_in_buffer(buffer, entity, ComponentType::UiComponentList);
                }
                buffer.put_component(entity, value.into_value());
                true
            }
            None => {
                let mut value = self.writer.prepare(list);
                value.component_ids = Some(ids);
                match store.put(entity, value) {
                    Ok(()) => true,
                    Err(err) => {
                        log::debug!("{} UI list write failed for {:?}: {}", LOG_PREFIX, entity, err);
                        false
                    }
                }
            }
        }
    }
}
