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

use super::ComponentType;

/// An archetype filter: an entity matches when it carries every listed type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    required: Vec<ComponentType>,
}

impl Query {
    /// Matches entities carrying `component`.
    pub fn with(component: ComponentType) -> Self {
        Self {
            required: vec![component],
        }
    }

    /// Additionally requires `component`.
    #[must_use]
    pub fn and(mut self, component: ComponentType) -> Self {
        if !self.required.contains(&component) {
            self.required.push(component);
        }
        self
    }

    /// The required component types.
    pub fn required(&self) -> &[ComponentType] {
        &self.required
    }

    /// Returns `true` if an entity carrying `has` satisfies the query.
    pub fn matches(&self, has: impl Fn(ComponentType) -> bool) -> bool {
        self.required.iter().all(|ty| has(*ty))
    }
}

/// Why an entity started matching a system's query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddReason {
    /// The entity was spawned.
    Spawn,
    /// The entity gained a component and now matches.
    Archetype,
    /// The entity was loaded from a saved chunk.
    Load,
}

/// Why an entity stopped matching a system's query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveReason {
    /// The entity was despawned.
    Despawn,
    /// The entity lost a component and no longer matches.
    Archetype,
    /// The entity was unloaded with its chunk.
    Unload,
}
