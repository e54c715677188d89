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

//! World map marker providers.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::HostError;

/// Key of the built-in provider that draws player icons.
pub const PLAYER_ICONS_KEY: &str = "playerIcons";

/// One icon on the world map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    /// Stable marker id.
    pub id: String,
    /// Label shown next to the icon.
    pub label: String,
    /// World position (x, z).
    pub position: (f64, f64),
}

/// Produces the markers of one category.
pub trait MarkerProvider: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &str;

    /// Markers to draw this update.
    fn markers(&self) -> Vec<MapMarker>;
}

/// The raw provider table some revisions keep inside the map manager.
pub type MarkerProviderTable = Arc<RwLock<HashMap<String, Arc<dyn MarkerProvider>>>>;

/// A world's map manager.
///
/// Revisions differ in what they expose: accessor methods, only a setter, or only
/// the internal provider table. Every method is therefore optional.
pub trait WorldMapManager: Send + Sync {
    /// Reads the provider under `key`.
    fn provider(&self, key: &str) -> Result<Option<Arc<dyn MarkerProvider>>, HostError>;

    /// Installs `provider` under `key`.
    fn set_provider(&self, key: &str, provider: Arc<dyn MarkerProvider>) -> Result<(), HostError>;

    /// Removes the provider under `key`.
    fn remove_provider(&self, key: &str) -> Result<(), HostError>;

    /// The internal provider table.
    fn provider_table(&self) -> Result<MarkerProviderTable, HostError>;
}

/// How the provider table of one map manager can be reached.
///
/// Resolved once per world by probing the manager; afterwards every access goes
/// through the cached strategy.
#[derive(Clone)]
pub enum MarkerAccess {
    /// Getter, setter and remover methods are all available.
    Methods,
    /// Getter and setter exist but not the remover; removal goes through the table.
    MethodsWithTableRemove(MarkerProviderTable),
    /// Only the internal table is reachable.
    Table(MarkerProviderTable),
    /// Nothing usable.
    Unavailable,
}

impl MarkerAccess {
    /// Probes `manager` for a usable access strategy.
    pub fn resolve(manager: &dyn WorldMapManager) -> Self {
        let getter = !matches!(manager.provider(PLAYER_ICONS_KEY), Err(e) if e.is_unsupported());
        let table = manager
            .provider_table()
            .ok()
            .filter(|table| Self::table_looks_valid(table));

        if getter {
            let remover = !matches!(
                manager.remove_provider("__shroud_probe__"),
                Err(e) if e.is_unsupported()
            );
            if remover {
                return MarkerAccess::Methods;
            }
            if let Some(table) = table {
                return MarkerAccess::MethodsWithTableRemove(table);
            }
        }
        match table {
            Some(table) => MarkerAccess::Table(table),
            None => MarkerAccess::Unavailable,
        }
    }

    /// Spot-checks one entry: a real provider table holds named providers.
    fn table_looks_valid(table: &MarkerProviderTable) -> bool {
        read_table(table)
            .iter()
            .next()
            .map_or(true, |(key, provider)| !key.is_empty() && !provider.name().is_empty())
    }

    /// Returns `true` if the provider table can be read and written.
    pub fn is_available(&self) -> bool {
        !matches!(self, MarkerAccess::Unavailable)
    }

    /// Reads the provider under `key`.
    pub fn get(
        &self,
        manager: &dyn WorldMapManager,
        key: &str,
    ) -> Result<Option<Arc<dyn MarkerProvider>>, HostError> {
        match self {
            MarkerAccess::Methods | MarkerAccess::MethodsWithTableRemove(_) => manager.provider(key),
            MarkerAccess::Table(table) => Ok(read_table(table).get(key).cloned()),
            MarkerAccess::Unavailable => Err(HostError::Unsupported("marker provider table")),
        }
    }

    /// Installs `provider` under `key`.
    pub fn set(
        &self,
        manager: &dyn WorldMapManager,
        key: &str,
        provider: Arc<dyn MarkerProvider>,
    ) -> Result<(), HostError> {
        match self {
            MarkerAccess::Methods | MarkerAccess::MethodsWithTableRemove(_) => {
                manager.set_provider(key, provider)
            }
            MarkerAccess::Table(table) => {
                write_table(table).insert(key.to_owned(), provider);
                Ok(())
            }
            MarkerAccess::Unavailable => Err(HostError::Unsupported("marker provider table")),
        }
    }

    /// Removes the provider under `key`.
    pub fn remove(&self, manager: &dyn WorldMapManager, key: &str) -> Result<(), HostError> {
        match self {
            MarkerAccess::Methods => manager.remove_provider(key),
            MarkerAccess::MethodsWithTableRemove(table) | MarkerAccess::Table(table) => {
                write_table(table).remove(key);
                Ok(())
            }
            MarkerAccess::Unavailable => Err(HostError::Unsupported("marker provider table")),
        }
    }
}

impl fmt::Debug for MarkerAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MarkerAccess::Methods => "Methods",
            MarkerAccess::MethodsWithTableRemove(_) => "MethodsWithTableRemove",
            MarkerAccess::Table(_) => "Table",
            MarkerAccess::Unavailable => "Unavailable",
        };
        f.write_str(name)
    }
}

fn read_table(
    table: &MarkerProviderTable,
) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<dyn MarkerProvider>>> {
    table.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_table(
    table: &MarkerProviderTable,
) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<dyn MarkerProvider>>> {
    table.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
