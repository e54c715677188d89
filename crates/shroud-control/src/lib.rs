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

//! # Shroud Control
//!
//! The plugin orchestrator. It wires the engine into a host server, persists the
//! configuration, runs the background baseline sweep and exposes the operator
//! surfaces: the `/hid` command and the settings dashboard.

#![warn(missing_docs)]

pub mod background;
pub mod command;
pub mod config_manager;
pub mod dashboard;
pub mod plugin;

pub use background::{BackgroundJobs, BaselineGcTicker};
pub use command::HidCommand;
pub use config_manager::{ConfigError, ConfigManager};
pub use dashboard::{DashboardPage, Toggle};
pub use plugin::{HideSettingsPlugin, PluginOptions, DEFAULT_CONFIG_PATH};
