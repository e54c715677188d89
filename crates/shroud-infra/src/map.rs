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

//! World map manager.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use shroud_core::host::map::PLAYER_ICONS_KEY;
use shroud_core::host::{MapMarker, MarkerProvider, MarkerProviderTable, WorldMapManager};
use shroud_core::HostError;

/// Which map-manager API a server revision exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapApi {
    /// Getter, setter and remover.
    Methods,
    /// Getter and setter, plus the raw provider table. No remover.
    NoRemover,
    /// Only the raw provider table.
    TableOnly,
    /// Nothing.
    None,
}

/// The built-in provider drawing one icon per player.
#[derive(Debug, Default)]
pub struct PlayerIconsProvider;

impl MarkerProvider for PlayerIconsProvider {
    fn name(&self) -> &str {
        "PlayerIconsProvider"
    }

    fn markers(&self) -> Vec<MapMarker> {
        vec![MapMarker {
            id: "player".into(),
            label: "Player".into(),
            position: (0.0, 0.0),
        }]
    }
}

/// Map manager with a configurable API surface.
pub struct MemoryMapManager {
    api: MapApi,
    table: MarkerProviderTable,
}

impl MemoryMapManager {
    /// Creates a manager with the built-in player icon provider installed.
    pub fn new(api: MapApi) -> Self {
        let mut providers: HashMap<String, Arc<dyn MarkerProvider>> = HashMap::new();
        providers.insert(PLAYER_ICONS_KEY.to_owned(), Arc::new(PlayerIconsProvider));
        Self {
            api,
            table: Arc::new(RwLock::new(providers)),
        }
    }

    /// The exposed API surface.
    pub fn api(&self) -> MapApi {
        self.api
    }

    /// Reads the table directly, whatever the API surface.
    pub fn installed(&self, key: &str) -> Option<Arc<dyn MarkerProvider>> {
        self.table
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    /// Name of the provider installed under `key`.
    pub fn installed_name(&self, key: &str) -> Option<String> {
        self.installed(key).map(|provider| provider.name().to_owned())
    }

    fn has_methods(&self) -> bool {
        matches!(self.api, MapApi::Methods | MapApi::NoRemover)
    }
}

impl WorldMapManager for MemoryMapManager {
    fn provider(&self, key: &str) -> Result<Option<Arc<dyn MarkerProvider>>, HostError> {
        if !self.has_methods() {
            return Err(HostError::Unsupported("WorldMapManager::getMarkerProvider"));
        }
        Ok(self.installed(key))
    }

    fn set_provider(&self, key: &str, provider: Arc<dyn MarkerProvider>) -> Result<(), HostError> {
        if !self.has_methods() {
            return Err(HostError::Unsupported("WorldMapManager::setMarkerProvider"));
        }
        self.table
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_owned(), provider);
        Ok(())
    }

    fn remove_provider(&self, key: &str) -> Result<(), HostError> {
        if self.api != MapApi::Methods {
            return Err(HostError::Unsupported("WorldMapManager::removeMarkerProvider"));
        }
        self.table
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }

    fn provider_table(&self) -> Result<MarkerProviderTable, HostError> {
        match self.api {
            MapApi::None | MapApi::Methods => {
                Err(HostError::Unsupported("WorldMapManager::markerProviders"))
            }
            MapApi::NoRemover | MapApi::TableOnly => Ok(Arc::clone(&self.table)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shroud_core::host::MarkerAccess;

    #[test]
    fn test_access_resolution_per_api() {
        let resolve = |api| MarkerAccess::resolve(&MemoryMapManager::new(api));
        assert!(matches!(resolve(MapApi::Methods), MarkerAccess::Methods));
        assert!(matches!(
            resolve(MapApi::NoRemover),
            MarkerAccess::MethodsWithTableRemove(_)
        ));
        assert!(matches!(resolve(MapApi::TableOnly), MarkerAccess::Table(_)));
        assert!(matches!(resolve(MapApi::None), MarkerAccess::Unavailable));
    }

    #[test]
    fn test_table_access_removes_entry() {
        let manager = MemoryMapManager::new(MapApi::NoRemover);
        let access = MarkerAccess::resolve(&manager);
        access.remove(&manager, PLAYER_ICONS_KEY).unwrap();
        assert!(manager.installed(PLAYER_ICONS_KEY).is_none());
        access
            .set(&manager, PLAYER_ICONS_KEY, Arc::new(PlayerIconsProvider))
            .unwrap();
        assert_eq!(
            manager.installed_name(PLAYER_ICONS_KEY).as_deref(),
            Some("PlayerIconsProvider")
        );
    }
}
