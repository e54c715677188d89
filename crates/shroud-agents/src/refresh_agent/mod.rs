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

//! The world refresh coordinator.
//!
//! Refresh requests from operator commands, the dashboard and the background
//! ticker are coalesced into a pending [`WorkSet`]. A single caller at a time
//! drains it: each iteration swaps the pending set to empty and posts one task
//! per loaded world that runs every selected pass on that world's execution
//! context. Callers that find a drain in progress return at once; their bits are
//! picked up by the running drain or by its exit re-check.

pub mod passes;
mod stats;

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use shroud_core::host::HostWorld;
use shroud_core::LOG_PREFIX;

use crate::engine::Engine;

pub use stats::{GcStats, PassStats};

shroud_core::shroud_bitflags! {
    /// Classes of refresh work.
    pub struct WorkSet: u32 {
        /// Re-apply both lanes to loaded players.
        const PLAYERS = 1 << 0;
        /// Re-apply the UI-list lane to loaded NPCs.
        const NPCS = 1 << 1;
        /// Reclaim baselines of entities that are gone.
        const BASELINE_GC = 1 << 2;
        /// Put every captured nameplate back, whatever the configuration.
        const RESTORE_NAMEPLATES = 1 << 3;
    }
}

impl WorkSet {
    /// Players and NPCs.
    pub const ALL: WorkSet = WorkSet::from_bits_truncate(Self::PLAYERS.bits() | Self::NPCS.bits());
}

/// Coalescing, single-flight driver of the per-world passes.
pub struct RefreshCoordinator {
    engine: Arc<Engine>,
    pending: AtomicU32,
    running: AtomicBool,
    drains: AtomicUsize,
    posted: AtomicUsize,
}

impl RefreshCoordinator {
    /// Creates a coordinator running passes with `engine`.
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            pending: AtomicU32::new(0),
            running: AtomicBool::new(false),
            drains: AtomicUsize::new(0),
            posted: AtomicUsize::new(0),
        }
    }

    /// The engine the passes run with.
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Re-applies the configuration to every loaded player.
    pub fn refresh_players(&self) {
        self.request(WorkSet::PLAYERS);
    }

    /// Re-applies the configuration to every loaded NPC.
    pub fn refresh_npcs(&self) {
        self.request(WorkSet::NPCS);
    }

    /// Re-applies the configuration to every loaded player and NPC.
    pub fn refresh_all(&self) {
        self.request(WorkSet::ALL);
    }

    /// Sweeps baselines of entities that no longer exist.
    pub fn baseline_gc(&self) {
        self.request(WorkSet::BASELINE_GC);
    }

    /// Restores every hidden nameplate regardless of the configuration.
    pub fn restore_nameplates(&self) {
        self.request(WorkSet::RESTORE_NAMEPLATES);
    }

    /// Adds `work` to the pending set and drains it unless another caller
    /// already is.
    pub fn request(&self, work: WorkSet) {
        if work.is_empty() {
            return;
        }
        self.pending.fetch_or(work.bits(), Ordering::AcqRel);
        loop {
            if self
                .running
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return;
            }
            self.drains.fetch_add(1, Ordering::AcqRel);
            self.drain();
            self.running.store(false, Ordering::Release);
            // A request may have landed between the last swap and the release.
            if self.pending.load(Ordering::Acquire) == 0 {
                return;
            }
        }
    }

    fn drain(&self) {
        loop {
            let work = WorkSet::from_bits_truncate(self.pending.swap(0, Ordering::AcqRel));
            if work.is_empty() {
                return;
            }
            log::debug!("{} Refresh drain: {:?}", LOG_PREFIX, work);
            for world in self.engine.host().worlds() {
                self.post(&world, work);
            }
        }
    }

    fn post(&self, world: &Arc<dyn HostWorld>, work: WorkSet) {
        let engine = Arc::clone(&self.engine);
        let target = Arc::clone(world);
        self.posted.fetch_add(1, Ordering::AcqRel);
        self.engine.compat().run_on_world(
            world,
            Box::new(move || passes::run(&engine, target.as_ref(), work)),
        );
    }

    /// Returns `true` while a drain loop is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Number of drain loops started so far.
    pub fn drains_started(&self) -> usize {
        self.drains.load(Ordering::Acquire)
    }

    /// Number of per-world tasks posted so far.
    pub fn tasks_posted(&self) -> usize {
        self.posted.load(Ordering::Acquire)
    }

    /// Waits until nothing is pending and every world has run the tasks posted
    /// so far. Returns `false` on timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.is_running() || self.pending.load(Ordering::Acquire) != 0 {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }

        let worlds = self.engine.host().worlds();
        let (done, finished) = bounded::<()>(worlds.len());
        for world in &worlds {
            let done = done.clone();
            self.engine.compat().run_on_world(
                world,
                Box::new(move || {
                    let _ = done.send(());
                }),
            );
        }
        drop(done);
        for _ in 0..worlds.len() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if finished.recv_timeout(remaining).is_err() {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_players_and_npcs() {
        assert!(WorkSet::ALL.contains(WorkSet::PLAYERS));
        assert!(WorkSet::ALL.contains(WorkSet::NPCS));
        assert!(!WorkSet::ALL.intersects(WorkSet::BASELINE_GC | WorkSet::RESTORE_NAMEPLATES));
    }

    #[test]
    fn test_bits_are_distinct() {
        let every = WorkSet::PLAYERS
            | WorkSet::NPCS
            | WorkSet::BASELINE_GC
            | WorkSet::RESTORE_NAMEPLATES;
        assert_eq!(every.bits().count_ones(), 4);
    }
}
