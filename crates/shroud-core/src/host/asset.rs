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

//! The host's UI-component asset table.

use crate::ecs::UiComponentId;
use crate::HostError;

/// What kind of overhead UI piece an asset describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityUiType {
    /// A bar bound to one entity stat (health, stamina, ...).
    EntityStat,
    /// Floating damage and heal numbers.
    CombatText,
    /// Anything else.
    Other,
}

/// The wire form of one UI-component asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiAssetPacket {
    /// The UI piece kind.
    pub kind: EntityUiType,
    /// Stat index for [`EntityUiType::EntityStat`] pieces, unused otherwise.
    pub entity_stat_index: i32,
}

impl UiAssetPacket {
    /// A stat bar bound to `stat_index`.
    pub const fn entity_stat(stat_index: i32) -> Self {
        Self {
            kind: EntityUiType::EntityStat,
            entity_stat_index: stat_index,
        }
    }

    /// A combat text piece.
    pub const fn combat_text() -> Self {
        Self {
            kind: EntityUiType::CombatText,
            entity_stat_index: -1,
        }
    }

    /// A piece the plugin never touches.
    pub const fn other() -> Self {
        Self {
            kind: EntityUiType::Other,
            entity_stat_index: -1,
        }
    }
}

/// Indexed lookup over the UI-component assets. Ids run from `0` to `next_index()`.
pub trait UiAssetTable: Send + Sync {
    /// One past the highest assigned id.
    fn next_index(&self) -> u32;

    /// Converts the asset at `id` to its wire packet. `Ok(None)` for empty slots.
    fn packet(&self, id: UiComponentId) -> Result<Option<UiAssetPacket>, HostError>;
}
