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

//! Reactive ECS systems.
//!
//! The host keeps these for its whole lifetime and drives them from its worker
//! threads. Each callback resolves the engine through the shared [`EngineSlot`]
//! and hands the lane the write batch the host provided.
//!
//! [`EngineSlot`]: crate::EngineSlot

mod nameplate_systems;
mod ui_list_systems;

pub use nameplate_systems::{NameplateChangeSystem, NameplateLifecycleSystem};
pub use ui_list_systems::{UiListChangeSystem, UiListLifecycleSystem};
