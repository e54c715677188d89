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

//! Id list filtering.

use std::collections::HashSet;

use shroud_core::config::TargetSettings;
use shroud_core::ecs::UiComponentId;
use shroud_data::AssetClassifier;

/// Removes duplicate ids, keeping the first occurrence of each.
pub fn dedup_preserving_order(ids: &[UiComponentId]) -> Vec<UiComponentId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Computes the ids an entity should carry: the baseline minus every id of a
/// hidden category. The result never shares storage with `baseline`.
pub fn desired_ids(
    baseline: &[UiComponentId],
    settings: TargetSettings,
    classifier: &AssetClassifier,
) -> Vec<UiComponentId> {
    baseline
        .iter()
        .copied()
        .filter(|id| {
            let hidden_combat = settings.hide_damage_numbers && classifier.is_combat_text(*id);
            let hidden_health = settings.hide_health_bar && classifier.is_health_stat(*id);
            !hidden_combat && !hidden_health
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shroud_core::host::{HostFeatures, UiAssetPacket};
    use shroud_infra::MemoryServer;

    fn classifier() -> AssetClassifier {
        let server = MemoryServer::new(HostFeatures::CURRENT);
        server
            .assets()
            .set(22, UiAssetPacket::entity_stat(MemoryServer::HEALTH_STAT_INDEX));
        server.assets().set(37, UiAssetPacket::combat_text());
        let classifier = AssetClassifier::new();
        assert!(classifier.ensure_ready(server.as_ref()));
        classifier
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        assert_eq!(dedup_preserving_order(&[5, 3, 5, 1, 3]), vec![5, 3, 1]);
        assert!(dedup_preserving_order(&[]).is_empty());
    }

    #[test]
    fn test_desired_ids_per_category() {
        let classifier = classifier();
        let baseline = [10, 22, 37];
        let health_only = TargetSettings {
            hide_health_bar: true,
            hide_damage_numbers: false,
        };
        let both = TargetSettings {
            hide_health_bar: true,
            hide_damage_numbers: true,
        };
        assert_eq!(desired_ids(&baseline, health_only, &classifier), vec![10, 37]);
        assert_eq!(desired_ids(&baseline, both, &classifier), vec![10]);
        assert_eq!(
            desired_ids(&baseline, TargetSettings::default(), &classifier),
            baseline.to_vec()
        );
    }
}
