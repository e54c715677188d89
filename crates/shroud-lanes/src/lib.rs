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

//! # Shroud Lanes
//!
//! The hot path: pure state transitions that read one entity, consult the
//! published configuration and either write a filtered projection of its
//! components or restore them from the captured baseline.

#![warn(missing_docs)]

pub mod override_lane;

pub use override_lane::{CategoryHint, CloneStrategy, NameplateLane, UiListLane, WritePreparer};
