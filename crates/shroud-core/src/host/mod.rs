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

//! The host server surface.
//!
//! These traits are the only way the engine touches the game server. Several
//! server builds exist and not all of them expose every API; optional APIs return
//! [`HostError::Unsupported`] and are probed once through [`ServerHost::probe`]
//! (see [`compat`]).

pub mod asset;
pub mod command;
pub mod compat;
pub mod map;
pub mod store;
pub mod system;
pub mod world;

use std::sync::Arc;

use crate::HostError;

pub use asset::{EntityUiType, UiAssetPacket, UiAssetTable};
pub use command::{CommandHandler, CommandSender, CustomPage, NotificationStyle, PageUpdate, PageView};
pub use compat::{HostCompat, HostFeature, HostFeatures};
pub use map::{MapMarker, MarkerAccess, MarkerProvider, MarkerProviderTable, WorldMapManager};
pub use store::{ArchetypeChunk, CommandBuffer, EntityHandle, EntityStore, EntityStoreExt};
pub use system::{RefChangeSystem, RefSystem};
pub use world::{HostWorld, NpcRef, PlayerRef, WorldExecutor, WorldTask};

/// Callback invoked when the host loads a new world.
pub type WorldListener = Box<dyn Fn(Arc<dyn HostWorld>) + Send + Sync>;

/// The game server as seen by the plugin.
pub trait ServerHost: Send + Sync {
    /// Every currently loaded world.
    fn worlds(&self) -> Vec<Arc<dyn HostWorld>>;

    /// The UI-component asset table.
    fn ui_assets(&self) -> Result<Arc<dyn UiAssetTable>, HostError>;

    /// Index of the health stat among the host's entity stat types.
    fn health_stat_index(&self) -> Result<i32, HostError>;

    /// Feature detection: returns `true` if this host revision exposes `feature`.
    ///
    /// Called once per feature at startup; never on a hot path.
    fn probe(&self, feature: HostFeature) -> bool;

    /// Registers an entity lifecycle system.
    fn register_ref_system(&self, system: Arc<dyn RefSystem>) -> Result<(), HostError>;

    /// Registers a component change system.
    fn register_change_system(&self, system: Arc<dyn RefChangeSystem>) -> Result<(), HostError>;

    /// Registers a root command.
    fn register_command(&self, command: Arc<dyn CommandHandler>) -> Result<(), HostError>;

    /// Subscribes to world-added events.
    fn on_world_added(&self, listener: WorldListener) -> Result<(), HostError>;
}
