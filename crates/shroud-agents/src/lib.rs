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

//! # Shroud Agents
//!
//! The agents own the engine value and decide *when* the lanes run: reactive ECS
//! systems for entities that enter or change, the refresh coordinator for
//! operator-triggered passes over loaded worlds, and the map-marker controller.

#![warn(missing_docs)]

pub mod compat;
pub mod engine;
pub mod map_agent;
pub mod override_agent;
pub mod refresh_agent;

pub use compat::ProbedCompat;
pub use engine::{Engine, EngineSlot};
pub use map_agent::{MapMarkerController, NoopMarkerProvider};
pub use override_agent::{
    NameplateChangeSystem, NameplateLifecycleSystem, UiListChangeSystem, UiListLifecycleSystem,
};
pub use refresh_agent::{GcStats, PassStats, RefreshCoordinator, WorkSet};
