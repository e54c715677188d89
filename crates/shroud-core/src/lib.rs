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

//! # Shroud Core
//!
//! Foundational crate containing the traits, core types, and interface contracts
//! shared by every layer of the hide-settings plugin.
//!
//! Nothing in this crate talks to a concrete game server. The host is described
//! entirely through the traits in [`host`]; the engine crates consume only those
//! traits, and `shroud-infra` provides an in-memory implementation.

#![warn(missing_docs)]

pub mod config;
pub mod diagnostics;
pub mod ecs;
pub mod error;
pub mod host;
pub mod utils;

pub use config::HideConfig;
pub use error::HostError;

/// Prefix attached to every log line emitted by the plugin.
pub const LOG_PREFIX: &str = "[ServerHideSettings]";

/// Human readable plugin name used in notifications and command output.
pub const DISPLAY_NAME: &str = "Server Hide Settings";

/// Capability string required by `reload`, `ui` and dashboard mutations.
pub const ADMIN_PERMISSION: &str = "serverhidesettings.admin";
