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

//! Periodic background work.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use shroud_agents::RefreshCoordinator;
use shroud_core::config::BaselineGcSettings;
use shroud_core::LOG_PREFIX;

/// Name of the background thread.
pub const BACKGROUND_THREAD_NAME: &str = "ServerHideSettings-Background";

/// Requests a baseline sweep at a fixed interval on a dedicated thread.
///
/// The first sweep happens one interval after spawning. Dropping the ticker
/// stops the thread.
pub struct BaselineGcTicker {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    ticks: Arc<AtomicUsize>,
    interval: Duration,
}

impl BaselineGcTicker {
    /// Spawns the thread.
    pub fn spawn(interval: Duration, coordinator: Arc<RefreshCoordinator>) -> io::Result<Self> {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);

        let handle = thread::Builder::new()
            .name(BACKGROUND_THREAD_NAME.to_owned())
            .spawn(move || {
                log::debug!("{} Background thread started.", LOG_PREFIX);
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            counter.fetch_add(1, Ordering::AcqRel);
                            coordinator.baseline_gc();
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                log::debug!("{} Background thread stopped.", LOG_PREFIX);
            })?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
            ticks,
            interval,
        })
    }

    /// Number of sweeps requested so far.
    pub fn ticks(&self) -> usize {
        self.ticks.load(Ordering::Acquire)
    }

    /// Time between two sweeps.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stops the thread and waits for it.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for BaselineGcTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The configuration-driven background jobs.
#[derive(Default)]
pub struct BackgroundJobs {
    gc: Option<BaselineGcTicker>,
}

impl BackgroundJobs {
    /// No jobs running.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops whatever runs, then starts the jobs `settings` asks for.
    pub fn restart(&mut self, settings: &BaselineGcSettings, coordinator: &Arc<RefreshCoordinator>) {
        self.stop();
        if !settings.enabled {
            return;
        }
        let interval = settings.interval();
        match BaselineGcTicker::spawn(interval, Arc::clone(coordinator)) {
            Ok(ticker) => {
                log::info!(
                    "{} Baseline GC enabled (interval={}s)",
                    LOG_PREFIX,
                    settings.interval_seconds
                );
                self.gc = Some(ticker);
            }
            Err(err) => log::warn!("{} Failed to start background thread: {}", LOG_PREFIX, err),
        }
    }

    /// Stops every job.
    pub fn stop(&mut self) {
        if let Some(mut ticker) = self.gc.take() {
            ticker.stop();
        }
    }

    /// The baseline sweep ticker, if running.
    pub fn baseline_gc(&self) -> Option<&BaselineGcTicker> {
        self.gc.as_ref()
    }
}
