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

//! UI-component asset table.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use shroud_core::ecs::UiComponentId;
use shroud_core::host::{UiAssetPacket, UiAssetTable};
use shroud_core::HostError;

/// A growable asset table. Unassigned ids describe [`UiAssetPacket::other`] pieces.
#[derive(Debug, Default)]
pub struct MemoryAssets {
    packets: RwLock<Vec<UiAssetPacket>>,
    failing: AtomicBool,
}

impl MemoryAssets {
    /// Creates a table of `len` neutral pieces.
    pub fn new(len: u32) -> Self {
        Self {
            packets: RwLock::new(vec![UiAssetPacket::other(); len as usize]),
            failing: AtomicBool::new(false),
        }
    }

    /// Assigns `packet` to `id`, growing the table if needed.
    pub fn set(&self, id: UiComponentId, packet: UiAssetPacket) {
        let mut packets = self.packets.write().unwrap_or_else(|e| e.into_inner());
        let index = id as usize;
        if index >= packets.len() {
            packets.resize(index + 1, UiAssetPacket::other());
        }
        packets[index] = packet;
    }

    /// Makes every read fail, as a server does while assets are reloading.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Release);
    }
}

impl UiAssetTable for MemoryAssets {
    fn next_index(&self) -> u32 {
        self.packets.read().unwrap_or_else(|e| e.into_inner()).len() as u32
    }

    fn packet(&self, id: UiComponentId) -> Result<Option<UiAssetPacket>, HostError> {
        if self.failing.load(Ordering::Acquire) {
            return Err(HostError::Asset("asset table is reloading".into()));
        }
        let packets = self.packets.read().unwrap_or_else(|e| e.into_inner());
        Ok(packets.get(id as usize).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_grows_table() {
        let assets = MemoryAssets::new(4);
        assets.set(9, UiAssetPacket::combat_text());
        assert_eq!(assets.next_index(), 10);
        assert_eq!(assets.packet(9).unwrap(), Some(UiAssetPacket::combat_text()));
        assert_eq!(assets.packet(5).unwrap(), Some(UiAssetPacket::other()));
        assert_eq!(assets.packet(10).unwrap(), None);
    }

    #[test]
    fn test_failing_reads() {
        let assets = MemoryAssets::new(1);
        assets.set_failing(true);
        assert!(assets.packet(0).is_err());
    }
}
