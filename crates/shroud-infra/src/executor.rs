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

//! World execution contexts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam_channel::Sender;
use shroud_core::host::{WorldExecutor, WorldTask};
use shroud_core::HostError;

/// Runs tasks on the calling thread.
#[derive(Debug, Default)]
pub struct InlineExecutor {
    executed: AtomicUsize,
}

impl InlineExecutor {
    /// Creates an executor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks run so far.
    pub fn executed(&self) -> usize {
        self.executed.load(Ordering::Acquire)
    }
}

impl WorldExecutor for InlineExecutor {
    fn execute(&self, task: WorldTask) -> Result<(), HostError> {
        task();
        self.executed.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

enum Message {
    Task(WorldTask),
    Sync(Sender<()>),
}

/// A dedicated world thread fed through a channel.
pub struct ThreadExecutor {
    sender: Mutex<Option<Sender<Message>>>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
    executed: Arc<AtomicUsize>,
}

impl ThreadExecutor {
    /// Starts the world thread.
    pub fn spawn(name: &str) -> std::io::Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded::<Message>();
        let executed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&executed);
        let handle = thread::Builder::new()
            .name(format!("world-{name}"))
            .spawn(move || {
                log::trace!("World thread started.");
                while let Ok(message) = rx.recv() {
                    match message {
                        Message::Task(task) => {
                            task();
                            counter.fetch_add(1, Ordering::AcqRel);
                        }
                        Message::Sync(done) => {
                            let _ = done.send(());
                        }
                    }
                }
                log::trace!("World thread stopped.");
            })?;
        Ok(Self {
            sender: Mutex::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
            executed,
        })
    }

    /// Number of tasks run so far.
    pub fn executed(&self) -> usize {
        self.executed.load(Ordering::Acquire)
    }

    /// Blocks until every task queued before this call has run.
    ///
    /// Returns `false` if the thread is gone.
    pub fn sync(&self) -> bool {
        let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
        let queued = match self.sender.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            Some(sender) => sender.send(Message::Sync(done_tx)).is_ok(),
            None => false,
        };
        queued && done_rx.recv().is_ok()
    }

    /// Stops the thread after it drained its queue.
    pub fn shutdown(&self) {
        self.sender.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = self.handle.lock().unwrap_or_else(|e| e.into_inner()).take() {
            if handle.join().is_err() {
                log::error!("World thread panicked.");
            }
        }
    }
}

impl WorldExecutor for ThreadExecutor {
    fn execute(&self, task: WorldTask) -> Result<(), HostError> {
        match self.sender.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            Some(sender) => sender
                .send(Message::Task(task))
                .map_err(|_| HostError::Executor("world thread stopped".into())),
            None => Err(HostError::Executor("world thread stopped".into())),
        }
    }
}

impl Drop for ThreadExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_executor_runs_in_order() {
        let executor = ThreadExecutor::spawn("test").unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for i in 0..10 {
            let seen = Arc::clone(&seen);
            executor
                .execute(Box::new(move || seen.lock().unwrap().push(i)))
                .unwrap();
        }
        assert!(executor.sync());
        assert_eq!(*seen.lock().unwrap(), (0..10).collect::<Vec<_>>());
        assert_eq!(executor.executed(), 10);
    }

    #[test]
    fn test_execute_after_shutdown_fails() {
        let executor = ThreadExecutor::spawn("test").unwrap();
        executor.shutdown();
        assert!(executor.execute(Box::new(|| {})).is_err());
        assert!(!executor.sync());
    }

    #[test]
    fn test_inline_executor_runs_immediately() {
        let executor = InlineExecutor::new();
        let hit = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hit);
        executor
            .execute(Box::new(move || {
                h.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
        assert_eq!(hit.load(Ordering::SeqCst), 1);
        assert_eq!(executor.executed(), 1);
    }
}
