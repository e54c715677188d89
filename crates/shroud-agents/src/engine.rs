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

//! The engine value and the slot that hands it to host-registered systems.

use std::sync::{Arc, RwLock};

use shroud_core::host::{HostCompat, ServerHost};
use shroud_data::{AssetClassifier, ConfigRegistry, NameplateBaselineCache, UiBaselineCache};
use shroud_lanes::{NameplateLane, UiListLane};

/// Everything the override engine owns: configuration, baselines, the asset
/// classifier and the two lanes built over them.
pub struct Engine {
    host: Arc<dyn ServerHost>,
    compat: Arc<dyn HostCompat>,
    config: Arc<ConfigRegistry>,
    ui_baselines: Arc<UiBaselineCache>,
    nameplate_baselines: Arc<NameplateBaselineCache>,
    classifier: Arc<AssetClassifier>,
    ui_lane: UiListLane,
    nameplate_lane: NameplateLane,
}

impl Engine {
    /// Builds an engine with empty caches.
    pub fn new(
        host: Arc<dyn ServerHost>,
        compat: Arc<dyn HostCompat>,
        config: Arc<ConfigRegistry>,
    ) -> Self {
        let ui_baselines = Arc::new(UiBaselineCache::new());
        let nameplate_baselines = Arc::new(NameplateBaselineCache::new());
        let classifier = Arc::new(AssetClassifier::new());
        let ui_lane = UiListLane::new(
            Arc::clone(&config),
            Arc::clone(&ui_baselines),
            Arc::clone(&classifier),
            Arc::clone(&host),
            Arc::clone(&compat),
        );
        let nameplate_lane = NameplateLane::new(
            Arc::clone(&config),
            Arc::clone(&nameplate_baselines),
            Arc::clone(&compat),
        );
        Self {
            host,
            compat,
            config,
            ui_baselines,
            nameplate_baselines,
            classifier,
            ui_lane,
            nameplate_lane,
        }
    }

    /// The host server.
    pub fn host(&self) -> &Arc<dyn ServerHost> {
        &self.host
    }

    /// The host compatibility layer.
    pub fn compat(&self) -> &Arc<dyn HostCompat> {
        &self.compat
    }

    /// The configuration registry.
    pub fn config(&self) -> &Arc<ConfigRegistry> {
        &self.config
    }

    /// UI-list baselines.
    pub fn ui_baselines(&self) -> &Arc<UiBaselineCache> {
        &self.ui_baselines
    }

    /// Nameplate baselines.
    pub fn nameplate_baselines(&self) -> &Arc<NameplateBaselineCache> {
        &self.nameplate_baselines
    }

    /// The UI asset classifier.
    pub fn classifier(&self) -> &Arc<AssetClassifier> {
        &self.classifier
    }

    /// The UI-list lane.
    pub fn ui_lane(&self) -> &UiListLane {
        &self.ui_lane
    }

    /// The nameplate lane.
    pub fn nameplate_lane(&self) -> &NameplateLane {
        &self.nameplate_lane
    }

    /// Drops every baseline and forgets the classifier tables.
    pub fn clear(&self) {
        self.ui_baselines.clear();
        self.nameplate_baselines.clear();
        self.classifier.reset();
    }
}

/// An atomically swappable engine reference.
///
/// The host keeps registered systems for its whole lifetime, across plugin
/// reloads. Systems therefore look the engine up here on every callback and do
/// nothing while the slot is empty.
#[derive(Default)]
pub struct EngineSlot {
    engine: RwLock<Option<Arc<Engine>>>,
}

impl EngineSlot {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `engine`, returning the previous one.
    pub fn install(&self, engine: Arc<Engine>) -> Option<Arc<Engine>> {
        self.engine
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .replace(engine)
    }

    /// The installed engine, if any.
    pub fn get(&self) -> Option<Arc<Engine>> {
        self.engine
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Empties the slot, returning the engine that was installed.
    pub fn clear(&self) -> Option<Arc<Engine>> {
        self.engine.write().unwrap_or_else(|e| e.into_inner()).take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProbedCompat;
    use shroud_core::host::HostFeatures;
    use shroud_core::HideConfig;
    use shroud_infra::MemoryServer;

    fn engine() -> Arc<Engine> {
        let server = MemoryServer::new(HostFeatures::CURRENT);
        Arc::new(Engine::new(
            server,
            Arc::new(ProbedCompat::new(HostFeatures::CURRENT)),
            Arc::new(ConfigRegistry::new(HideConfig::default())),
        ))
    }

    #[test]
    fn test_slot_install_and_clear() {
        let slot = EngineSlot::new();
        assert!(slot.get().is_none());

        let first = engine();
        assert!(slot.install(Arc::clone(&first)).is_none());
        assert!(Arc::ptr_eq(&slot.get().unwrap(), &first));

        let second = engine();
        let previous = slot.install(Arc::clone(&second)).unwrap();
        assert!(Arc::ptr_eq(&previous, &first), "install returns the replaced engine");

        assert!(Arc::ptr_eq(&slot.clear().unwrap(), &second));
        assert!(slot.get().is_none());
    }
}
