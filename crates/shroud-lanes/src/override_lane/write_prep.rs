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

//! Preparing component values for direct store writes.
//!
//! Some hosts detect changes by instance identity, so a direct store write must
//! hand over a distinct instance. How to obtain one depends on the component
//! type and is decided once, on the first write.

use std::marker::PhantomData;
use std::sync::OnceLock;

use shroud_core::diagnostics::WarnOnce;
use shroud_core::ecs::HostComponent;

/// How a distinct copy of a component is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneStrategy {
    /// The host's own clone contract.
    HostClone,
    /// A default instance with every field copied over.
    CopyFields,
    /// No copy available; the value is handed over as is.
    Identity,
}

/// Per component type write preparation.
pub struct WritePreparer<T: HostComponent> {
    strategy: OnceLock<CloneStrategy>,
    copy_failed: WarnOnce,
    _component: PhantomData<fn() -> T>,
}

impl<T: HostComponent> WritePreparer<T> {
    /// Creates a preparer. The strategy is probed on the first value.
    pub fn new() -> Self {
        Self {
            strategy: OnceLock::new(),
            copy_failed: WarnOnce::new(),
            _component: PhantomData,
        }
    }

    /// The strategy in use, probing it against `sample` if not decided yet.
    pub fn strategy(&self, sample: &T) -> CloneStrategy {
        *self.strategy.get_or_init(|| {
            let strategy = if sample.host_clone().is_some() {
                CloneStrategy::HostClone
            } else if T::default().copy_fields_from(sample) {
                CloneStrategy::CopyFields
            } else {
                CloneStrategy::Identity
            };
            log::debug!(
                "{} clone strategy for {:?}: {:?}",
                shroud_core::LOG_PREFIX,
                T::TYPE,
                strategy
            );
            strategy
        })
    }

    /// Returns a value that is safe to write directly to a store.
    pub fn prepare(&self, value: T) -> T {
        match self.strategy(&value) {
            CloneStrategy::HostClone => match value.host_clone() {
                Some(copy) => copy,
                None => self.identity(value),
            },
            CloneStrategy::CopyFields => {
                let mut copy = T::default();
                if copy.copy_fields_from(&value) {
                    copy
                } else {
                    self.identity(value)
                }
            }
            CloneStrategy::Identity => self.identity(value),
        }
    }

    fn identity(&self, value: T) -> T {
        self.copy_failed.warn(|| {
            format!(
                "Could not copy {:?} for direct store writes. If this server tracks changes \
                 by identity, refreshing already-spawned entities may not work.",
                T::TYPE
            )
        });
        value
    }
}

impl<T: HostComponent> Default for WritePreparer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shroud_core::ecs::{ComponentType, ComponentValue, Nameplate, UiComponentList};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Opaque(u8);

    impl HostComponent for Opaque {
        const TYPE: ComponentType = ComponentType::Nameplate;

        fn from_value(_: ComponentValue) -> Option<Self> {
            None
        }

        fn into_value(self) -> ComponentValue {
            Nameplate::empty().into()
        }
    }

    #[test]
    fn test_builtin_components_use_host_clone() {
        let preparer = WritePreparer::<UiComponentList>::new();
        let list = UiComponentList::new([1, 2, 3]);
        assert_eq!(preparer.strategy(&list), CloneStrategy::HostClone);
        assert_eq!(preparer.prepare(list.clone()), list);
        assert!(!preparer.copy_failed.has_fired());
    }

    #[test]
    fn test_uncopyable_component_falls_back_to_identity_once() {
        let preparer = WritePreparer::<Opaque>::new();
        assert_eq!(preparer.strategy(&Opaque(1)), CloneStrategy::Identity);
        assert_eq!(preparer.prepare(Opaque(7)), Opaque(7));
        assert!(preparer.copy_failed.has_fired());
        assert_eq!(preparer.prepare(Opaque(8)), Opaque(8));
    }
}
