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

//! The player nameplate override.

use std::sync::Arc;

use shroud_core::ecs::{ComponentType, EntityRef, HostComponent, Nameplate};
use shroud_core::host::{CommandBuffer, EntityStore, EntityStoreExt, HostCompat};
use shroud_core::{HostError, LOG_PREFIX};
use shroud_data::{ConfigRegistry, NameplateBaselineCache};

use super::write_prep::WritePreparer;

enum Action {
    Hide,
    Restore(Nameplate),
}

/// Removes and restores the nameplate of player entities.
pub struct NameplateLane {
    config: Arc<ConfigRegistry>,
    baselines: Arc<NameplateBaselineCache>,
    compat: Arc<dyn HostCompat>,
    writer: WritePreparer<Nameplate>,
}

impl NameplateLane {
    /// Creates the lane over the engine's shared state.
    pub fn new(
        config: Arc<ConfigRegistry>,
        baselines: Arc<NameplateBaselineCache>,
        compat: Arc<dyn HostCompat>,
    ) -> Self {
        Self {
            config,
            baselines,
            compat,
            writer: WritePreparer::new(),
        }
    }

    /// Applies the active configuration to a player entity.
    ///
    /// `force_restore` restores the nameplate whatever the configuration says;
    /// it is used when the plugin shuts down.
    ///
    /// Returns `true` if a write or removal was attempted.
    pub fn apply(
        &self,
        entity: EntityRef,
        store: &dyn EntityStore,
        buffer: Option<&mut dyn CommandBuffer>,
        force_restore: bool,
    ) -> bool {
        if !store.is_valid(entity) {
            return false;
        }
        if !matches!(store.has_component(entity, ComponentType::Player), Ok(true)) {
            return false;
        }
        let want_hide = !force_restore && self.config.current().hides_nameplates();
        let live = match store.get::<Nameplate>(entity) {
            Ok(live) => live,
            Err(_) => return false,
        };

        let entry = self.baselines.get_or_create(entity.key());
        // The lock is released before writing: stores may run change systems
        // synchronously, and those come back here for the same entity.
        let action = {
            let mut state = entry.lock();
            // An empty nameplate while hidden is our own placeholder.
            let placeholder = state.hidden && live.as_ref().is_some_and(|n| n.text.is_empty());
            if let Some(live) = live.as_ref().filter(|_| !placeholder) {
                if !state.hidden || want_hide {
                    state.baseline = Some(live.clone());
                }
            }

            if want_hide {
                if state.hidden && (live.is_none() || placeholder) {
                    return false;
                }
                state.hidden = true;
                Action::Hide
            } else if !state.hidden {
                return false;
            } else if let Some(baseline) = state.baseline.clone() {
                state.hidden = false;
                Action::Restore(baseline)
            } else {
                if live.is_some() {
                    state.hidden = false;
                }
                return false;
            }
        };

        match action {
            Action::Hide => {
                self.hide(entity, store, buffer);
                true
            }
            Action::Restore(baseline) => match self.put(entity, store, buffer, baseline) {
                Ok(()) => true,
                Err(err) => {
                    log::debug!("{} nameplate restore failed for {:?}: {}", LOG_PREFIX, entity, err);
                    entry.lock().hidden = true;
                    false
                }
            },
        }
    }

    fn hide(&self, entity: EntityRef, store: &dyn EntityStore, mut buffer: Option<&mut dyn CommandBuffer>) {
        let removed = match buffer.as_deref_mut() {
            Some(buffer) => self
                .compat
                .remove_in_buffer(buffer, entity, ComponentType::Nameplate),
            None => self
                .compat
                .remove_in_store(store, entity, ComponentType::Nameplate),
        };
        if removed {
            return;
        }
        // Hidden stays set even if this fails too, so the next trigger does not retry.
        if let Err(err) = self.put(entity, store, buffer, Nameplate::empty()) {
            log::debug!("{} nameplate hide failed for {:?}: {}", LOG_PREFIX, entity, err);
        }
    }

    fn put(
        &self,
        entity: EntityRef,
        store: &dyn EntityStore,
        buffer: Option<&mut dyn CommandBuffer>,
        value: Nameplate,
    ) -> Result<(), HostError> {
        match buffer {
            Some(buffer) => {
                buffer.put_component(entity, value.into_value());
                Ok(())
            }
            None => store.put(entity, self.writer.prepare(value)),
        }
    }
}
