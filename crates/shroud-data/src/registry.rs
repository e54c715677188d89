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

//! The published configuration snapshot.

use std::sync::{Arc, RwLock};

use shroud_core::HideConfig;

/// Holds the active configuration.
///
/// Publishing swaps the whole `Arc`; readers clone it and keep a consistent
/// snapshot for as long as they need, whatever is published meanwhile.
#[derive(Debug)]
pub struct ConfigRegistry {
    current: RwLock<Arc<HideConfig>>,
}

impl ConfigRegistry {
    /// Creates a registry holding `config`, normalized.
    pub fn new(config: HideConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(config.normalized())),
        }
    }

    /// The active snapshot.
    pub fn current(&self) -> Arc<HideConfig> {
        Arc::clone(&self.current.read().unwrap_or_else(|e| e.into_inner()))
    }

    /// Normalizes and publishes `config`, returning the published snapshot.
    pub fn publish(&self, config: HideConfig) -> Arc<HideConfig> {
        let snapshot = Arc::new(config.normalized());
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Arc::clone(&snapshot);
        log::debug!("{} config published", shroud_core::LOG_PREFIX);
        snapshot
    }
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::new(HideConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_publish_normalizes() {
        let registry = ConfigRegistry::default();
        let mut config = HideConfig::default();
        config.debug.baseline_gc.interval_seconds = 1;
        let published = registry.publish(config);
        assert_eq!(published.debug.baseline_gc.interval_seconds, 30);
        assert!(Arc::ptr_eq(&published, &registry.current()));
    }

    #[test]
    fn test_old_snapshot_survives_publish() {
        let registry = ConfigRegistry::default();
        let before = registry.current();
        registry.publish(HideConfig {
            enabled: false,
            ..HideConfig::default()
        });
        assert!(before.enabled, "readers keep the snapshot they took");
        assert!(!registry.current().enabled);
    }

    #[test]
    fn test_concurrent_readers_see_whole_snapshots() {
        let registry = Arc::new(ConfigRegistry::default());
        let a = HideConfig::default();
        let mut b = HideConfig::default();
        b.players.hide_health_bar = false;
        b.players.hide_damage_numbers = true;

        let writer = {
            let registry = Arc::clone(&registry);
            let (a, b) = (a.clone(), b.clone());
            thread::spawn(move || {
                for i in 0..500 {
                    registry.publish(if i % 2 == 0 { b.clone() } else { a.clone() });
                }
            })
        };
        for _ in 0..500 {
            let seen = registry.current();
            assert!(*seen == a || *seen == b, "never a partially written tree");
        }
        writer.join().unwrap();
    }
}
