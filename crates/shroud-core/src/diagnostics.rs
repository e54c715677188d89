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

//! One-shot diagnostics.

use std::sync::atomic::{AtomicBool, Ordering};

/// A latch that lets a warning through exactly once.
///
/// Used for every "per distinct cause" warning so a host that fails the same way
/// on every entity does not flood the log.
#[derive(Debug, Default)]
pub struct WarnOnce {
    fired: AtomicBool,
}

impl WarnOnce {
    /// Creates an armed latch.
    pub const fn new() -> Self {
        Self {
            fired: AtomicBool::new(false),
        }
    }

    /// Returns `true` the first time it is called, `false` afterwards.
    pub fn first(&self) -> bool {
        self.fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Logs `message` at `warn` level the first time only.
    pub fn warn(&self, message: impl FnOnce() -> String) {
        if self.first() {
            log::warn!("{} {}", crate::LOG_PREFIX, message());
        }
    }

    /// Returns `true` if the latch has fired.
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}
