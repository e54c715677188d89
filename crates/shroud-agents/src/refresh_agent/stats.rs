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

//! Per-world pass statistics.

use std::time::{Duration, Instant};

use shroud_core::LOG_PREFIX;

/// Counters of one pass over one world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassStats {
    /// Entities the pass looked at.
    pub visited: usize,
    /// Entities the lane actually rewrote.
    pub changed: usize,
    started: Instant,
}

impl PassStats {
    /// Starts the clock.
    pub fn start() -> Self {
        Self {
            visited: 0,
            changed: 0,
            started: Instant::now(),
        }
    }

    /// Counts one visited entity, and one change if `changed`.
    pub fn record(&mut self, changed: bool) {
        self.visited += 1;
        if changed {
            self.changed += 1;
        }
    }

    /// Time since [`PassStats::start`].
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Logs the counters when `enabled`.
    pub(crate) fn log(&self, enabled: bool, tag: &str, world: &str, population: &str) {
        if enabled {
            log::info!(
                "{}{} world={} {} visited={} changed={} timeMs={}",
                LOG_PREFIX,
                tag,
                world,
                population,
                self.visited,
                self.changed,
                self.elapsed().as_millis()
            );
        }
    }
}

/// Counters of one baseline GC pass over one world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcStats {
    /// Stores whose entries were swept.
    pub stores: usize,
    /// Live players observed.
    pub seen_players: usize,
    /// Live NPCs observed.
    pub seen_npcs: usize,
    /// Baseline entries removed, both caches together.
    pub removed: usize,
    started: Instant,
}

impl GcStats {
    pub(crate) fn start() -> Self {
        Self {
            stores: 0,
            seen_players: 0,
            seen_npcs: 0,
            removed: 0,
            started: Instant::now(),
        }
    }

    pub(crate) fn log(&self, enabled: bool, world: &str) {
        if enabled {
            log::info!(
                "{}[BaselineGC] world={} stores={} seenPlayers={} seenNpcs={} removed={} timeMs={}",
                LOG_PREFIX,
                world,
                self.stores,
                self.seen_players,
                self.seen_npcs,
                self.removed,
                self.started.elapsed().as_millis()
            );
        }
    }
}
