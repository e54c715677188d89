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

//! # Shroud Infra
//!
//! A complete in-memory host server. It implements every trait of
//! `shroud_core::host` with the same observable rules as a real server: writes
//! made inside callbacks are buffered and committed when the callback returns,
//! committed writes trigger the registered systems again, and optional APIs are
//! switched on and off through [`HostFeatures`](shroud_core::host::HostFeatures)
//! to reproduce older server revisions.

#![warn(missing_docs)]

pub mod assets;
pub mod executor;
pub mod map;
pub mod sender;
pub mod server;
pub mod store;
pub mod world;

pub use assets::MemoryAssets;
pub use executor::{InlineExecutor, ThreadExecutor};
pub use map::{MapApi, MemoryMapManager, PlayerIconsProvider};
pub use sender::{MemorySender, Notification};
pub use server::{ExecutorMode, MemoryServer, ServerOptions};
pub use store::{MemoryBuffer, MemoryStore, SystemRegistry};
pub use world::MemoryWorld;
