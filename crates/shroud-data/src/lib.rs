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

//! # Shroud Data
//!
//! State owned by the override engine for the lifetime of the process: the two
//! per-entity baseline caches, the UI asset classifier and the configuration
//! registry. Everything here is safe to share between host worker threads.

#![warn(missing_docs)]

pub mod baseline;
pub mod classifier;
pub mod registry;

pub use baseline::{
    EntryKind, NameplateBaselineCache, NameplateBaselineEntry, NameplateState, SweepKinds,
    UiBaselineCache, UiBaselineEntry,
};
pub use classifier::AssetClassifier;
pub use registry::ConfigRegistry;
