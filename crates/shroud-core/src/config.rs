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

//! The configuration snapshot.
//!
//! A [`HideConfig`] is a plain, normalized value. Once published through the
//! registry it is never mutated; changes are made on a copy and republished.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

/// Smallest accepted interval between two periodic baseline sweeps.
pub const MIN_BASELINE_GC_INTERVAL_SECS: i64 = 30;

/// Default interval between two periodic baseline sweeps.
pub const DEFAULT_BASELINE_GC_INTERVAL_SECS: i64 = 300;

/// Reads an explicit `null` as the default value, like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Root of the plugin configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HideConfig {
    /// Global switch. When off every entity is restored to its baseline.
    pub enabled: bool,
    /// Settings applied to player entities.
    #[serde(deserialize_with = "null_as_default")]
    pub players: PlayerSettings,
    /// Settings applied to NPC entities.
    #[serde(deserialize_with = "null_as_default")]
    pub npcs: NpcSettings,
    /// World map settings.
    #[serde(deserialize_with = "null_as_default")]
    pub map: MapSettings,
    /// Diagnostics and maintenance settings.
    #[serde(deserialize_with = "null_as_default")]
    pub debug: DebugSettings,
}

impl Default for HideConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            players: PlayerSettings::default(),
            npcs: NpcSettings::default(),
            map: MapSettings::default(),
            debug: DebugSettings::default(),
        }
    }
}

/// Settings for player entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerSettings {
    /// Remove health-stat overhead components.
    pub hide_health_bar: bool,
    /// Remove combat-text overhead components (damage and heal numbers).
    pub hide_damage_numbers: bool,
    /// Remove the nameplate component.
    pub hide_nameplate: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            hide_health_bar: true,
            hide_damage_numbers: false,
            hide_nameplate: false,
        }
    }
}

/// Settings for NPC entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NpcSettings {
    /// Remove health-stat overhead components.
    pub hide_health_bar: bool,
    /// Remove combat-text overhead components (damage and heal numbers).
    pub hide_damage_numbers: bool,
}

impl Default for NpcSettings {
    fn default() -> Self {
        Self {
            hide_health_bar: true,
            hide_damage_numbers: false,
        }
    }
}

/// World map settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapSettings {
    /// Replace the player icon marker provider with a no-op provider.
    pub hide_player_markers: bool,
}

/// Diagnostics and maintenance settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DebugSettings {
    /// Log one line per world pass with visited/changed counters.
    pub log_refresh_stats: bool,
    /// Periodic baseline sweep.
    #[serde(deserialize_with = "null_as_default")]
    pub baseline_gc: BaselineGcSettings,
}

/// Periodic baseline sweep settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaselineGcSettings {
    /// Run the sweep on a background timer.
    pub enabled: bool,
    /// Seconds between two sweeps. Never below [`MIN_BASELINE_GC_INTERVAL_SECS`]
    /// once normalized; signed so a negative value in the file is clamped rather
    /// than rejected.
    pub interval_seconds: i64,
}

impl BaselineGcSettings {
    /// Time between two sweeps, clamped to the minimum.
    pub fn interval(&self) -> Duration {
        let secs = self.interval_seconds.max(MIN_BASELINE_GC_INTERVAL_SECS);
        Duration::from_secs(secs.unsigned_abs())
    }
}

impl Default for BaselineGcSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_seconds: DEFAULT_BASELINE_GC_INTERVAL_SECS,
        }
    }
}

/// The two categories of entity the UI-list override distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetCategory {
    /// An entity carrying the player marker component.
    Player,
    /// An entity carrying the NPC marker component.
    Npc,
}

/// The UI-list hide flags that apply to one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetSettings {
    /// Remove health-stat overhead components.
    pub hide_health_bar: bool,
    /// Remove combat-text overhead components.
    pub hide_damage_numbers: bool,
}

impl TargetSettings {
    /// Returns `true` when neither overhead category is hidden.
    pub fn hides_nothing(&self) -> bool {
        !self.hide_health_bar && !self.hide_damage_numbers
    }
}

impl HideConfig {
    /// Clamps out-of-range values in place.
    ///
    /// Absent and null nested objects are already filled with defaults while
    /// reading, so the only remaining rule is the lower bound on the sweep
    /// interval.
    pub fn normalize(&mut self) {
        let gc = &mut self.debug.baseline_gc;
        gc.interval_seconds = gc.interval_seconds.max(MIN_BASELINE_GC_INTERVAL_SECS);
    }

    /// Returns a normalized copy.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Returns the UI-list hide flags for `category`.
    pub fn target(&self, category: TargetCategory) -> TargetSettings {
        match category {
            TargetCategory::Player => TargetSettings {
                hide_health_bar: self.players.hide_health_bar,
                hide_damage_numbers: self.players.hide_damage_numbers,
            },
            TargetCategory::Npc => TargetSettings {
                hide_health_bar: self.npcs.hide_health_bar,
                hide_damage_numbers: self.npcs.hide_damage_numbers,
            },
        }
    }

    /// Returns the flags hidden for both categories, used when an entity's
    /// category cannot be resolved yet.
    pub fn shared_target(&self) -> TargetSettings {
        let players = self.target(TargetCategory::Player);
        let npcs = self.target(TargetCategory::Npc);
        TargetSettings {
            hide_health_bar: players.hide_health_bar && npcs.hide_health_bar,
            hide_damage_numbers: players.hide_damage_numbers && npcs.hide_damage_numbers,
        }
    }

    /// Returns `true` when player nameplates must be hidden.
    pub fn hides_nameplates(&self) -> bool {
        self.enabled && self.players.hide_nameplate
    }

    /// Returns `true` when player map markers must be hidden.
    pub fn hides_player_markers(&self) -> bool {
        self.enabled && self.map.hide_player_markers
    }
}
