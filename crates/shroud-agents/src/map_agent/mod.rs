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

//! World-map player marker override.
//!
//! The original `playerIcons` provider of each world is captured once, before the
//! first override, and that exact value (possibly "no provider") is what restore
//! puts back. All provider mutations run on the world's execution context.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use shroud_core::ecs::WorldId;
use shroud_core::host::map::PLAYER_ICONS_KEY;
use shroud_core::host::{HostCompat, HostWorld, MapMarker, MarkerAccess, MarkerProvider, ServerHost, WorldMapManager};
use shroud_core::{HideConfig, LOG_PREFIX};

/// A marker provider that never emits anything.
#[derive(Debug, Default)]
pub struct NoopMarkerProvider;

impl MarkerProvider for NoopMarkerProvider {
    fn name(&self) -> &str {
        "NoopPlayerIcons"
    }

    fn markers(&self) -> Vec<MapMarker> {
        Vec::new()
    }
}

type Originals = HashMap<WorldId, Option<Arc<dyn MarkerProvider>>>;

struct Shared {
    compat: Arc<dyn HostCompat>,
    originals: Mutex<Originals>,
    noop: Arc<dyn MarkerProvider>,
}

impl Shared {
    fn originals(&self) -> MutexGuard<'_, Originals> {
        self.originals.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn apply_on_world(&self, world: &dyn HostWorld, hide: bool) {
        let Ok(manager) = world.map_manager() else {
            return;
        };
        let access = self.compat.marker_access(world, manager.as_ref());
        if !access.is_available() {
            return;
        }
        if hide {
            if !self.capture_once(world.id(), &access, manager.as_ref()) {
                return;
            }
            if let Err(err) = access.set(manager.as_ref(), PLAYER_ICONS_KEY, Arc::clone(&self.noop)) {
                log::debug!("{} Failed to hide player markers on {}: {}", LOG_PREFIX, world.name(), err);
            }
        } else {
            self.restore_on_world(world, &access, manager.as_ref());
        }
    }

    /// Returns `true` once the world's original provider is known.
    fn capture_once(&self, world: WorldId, access: &MarkerAccess, manager: &dyn WorldMapManager) -> bool {
        let mut originals = self.originals();
        if originals.contains_key(&world) {
            return true;
        }
        match access.get(manager, PLAYER_ICONS_KEY) {
            Ok(original) => {
                originals.insert(world, original);
                true
            }
            Err(err) => {
                log::debug!("{} Could not read player marker provider: {}", LOG_PREFIX, err);
                false
            }
        }
    }

    fn restore_on_world(&self, world: &dyn HostWorld, access: &MarkerAccess, manager: &dyn WorldMapManager) {
        let original = match self.originals().get(&world.id()) {
            Some(original) => original.clone(),
            None => return,
        };
        let result = match original {
            Some(provider) => access.set(manager, PLAYER_ICONS_KEY, provider),
            None => access.remove(manager, PLAYER_ICONS_KEY),
        };
        if let Err(err) = result {
            log::debug!("{} Failed to restore player markers on {}: {}", LOG_PREFIX, world.name(), err);
        }
    }
}

/// Hides or restores player icons on the world map.
#[derive(Clone)]
pub struct MapMarkerController {
    shared: Arc<Shared>,
}

impl MapMarkerController {
    /// Creates a controller that reaches map managers through `compat`.
    pub fn new(compat: Arc<dyn HostCompat>) -> Self {
        Self {
            shared: Arc::new(Shared {
                compat,
                originals: Mutex::new(HashMap::new()),
                noop: Arc::new(NoopMarkerProvider),
            }),
        }
    }

    /// Applies `config` to one world.
    pub fn apply_to_world(&self, world: &Arc<dyn HostWorld>, config: &HideConfig) {
        let hide = config.hides_player_markers();
        let shared = Arc::clone(&self.shared);
        let target = Arc::clone(world);
        self.shared.compat.run_on_world(
            world,
            Box::new(move || shared.apply_on_world(target.as_ref(), hide)),
        );
    }

    /// Applies `config` to every loaded world.
    pub fn apply_to_all(&self, host: &dyn ServerHost, config: &HideConfig) {
        for world in host.worlds() {
            self.apply_to_world(&world, config);
        }
    }

    /// Puts the captured provider back on every loaded world that was touched.
    pub fn restore_all(&self, host: &dyn ServerHost) {
        for world in host.worlds() {
            let shared = Arc::clone(&self.shared);
            let target = Arc::clone(&world);
            self.shared.compat.run_on_world(
                &world,
                Box::new(move || {
                    let Ok(manager) = target.map_manager() else {
                        return;
                    };
                    let access = shared.compat.marker_access(target.as_ref(), manager.as_ref());
                    if access.is_available() {
                        shared.restore_on_world(target.as_ref(), &access, manager.as_ref());
                    }
                }),
            );
        }
    }

    /// Returns `true` if the original provider of `world` has been captured.
    pub fn has_captured(&self, world: WorldId) -> bool {
        self.shared.originals().contains_key(&world)
    }

    /// Forgets what was captured for an unloaded world.
    pub fn forget_world(&self, world: WorldId) {
        self.shared.originals().remove(&world);
    }
}
