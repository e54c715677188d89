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

//! Component values the plugin reads and rewrites.

/// Identifier of an overhead UI piece, i.e. an index into the host's
/// UI-component asset table.
pub type UiComponentId = u32;

/// The component types the plugin cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// The ordered list of overhead UI pieces rendered for an entity.
    UiComponentList,
    /// The text shown above a player's head.
    Nameplate,
    /// Marker present on player entities.
    Player,
    /// Marker present on NPC entities.
    Npc,
}

/// The overhead UI pieces a client renders for one entity.
///
/// `component_ids` is optional because some host pipelines attach the component
/// before filling it in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiComponentList {
    /// Ordered ids of the UI pieces, or `None` while unset.
    pub component_ids: Option<Vec<UiComponentId>>,
}

impl UiComponentList {
    /// Creates a list holding `ids`.
    pub fn new(ids: impl Into<Vec<UiComponentId>>) -> Self {
        Self {
            component_ids: Some(ids.into()),
        }
    }

    /// Returns the ids, if set.
    pub fn ids(&self) -> Option<&[UiComponentId]> {
        self.component_ids.as_deref()
    }
}

/// The text shown above a player's head.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Nameplate {
    /// Rendered text. Empty renders nothing.
    pub text: String,
}

impl Nameplate {
    /// Creates a nameplate showing `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// An empty nameplate, used when the host cannot remove the component.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A component value crossing the host boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentValue {
    /// See [`UiComponentList`].
    UiComponentList(UiComponentList),
    /// See [`Nameplate`].
    Nameplate(Nameplate),
}

impl ComponentValue {
    /// Returns the type of the carried value.
    pub fn component_type(&self) -> ComponentType {
        match self {
            ComponentValue::UiComponentList(_) => ComponentType::UiComponentList,
            ComponentValue::Nameplate(_) => ComponentType::Nameplate,
        }
    }
}

/// A component with data that can travel as a [`ComponentValue`].
///
/// The optional copy hooks describe how a given component type can be turned into
/// a distinct instance for direct store writes; they are probed once per type to
/// pick a clone strategy.
pub trait HostComponent: Clone + Default + Send + Sync + 'static {
    /// The host component type this value belongs to.
    const TYPE: ComponentType;

    /// Extracts a typed value, or `None` if `value` is of another type.
    fn from_value(value: ComponentValue) -> Option<Self>;

    /// Wraps the value for the host boundary.
    fn into_value(self) -> ComponentValue;

    /// The host's own clone contract for this component, if it honours one.
    fn host_clone(&self) -> Option<Self> {
        None
    }

    /// Copies every field of `source` into `self` (no-arg construct + field copy).
    fn copy_fields_from(&mut self, source: &Self) -> bool {
        let _ = source;
        false
    }
}

impl HostComponent for UiComponentList {
    const TYPE: ComponentType = ComponentType::UiComponentList;

    fn from_value(value: ComponentValue) -> Option<Self> {
        match value {
            ComponentValue::UiComponentList(list) => Some(list),
            _ => None,
        }
    }

    fn into_value(self) -> ComponentValue {
        ComponentValue::UiComponentList(self)
    }

    fn host_clone(&self) -> Option<Self> {
        Some(self.clone())
    }

    fn copy_fields_from(&mut self, source: &Self) -> bool {
        self.component_ids.clone_from(&source.component_ids);
        true
    }
}

impl HostComponent for Nameplate {
    const TYPE: ComponentType = ComponentType::Nameplate;

    fn from_value(value: ComponentValue) -> Option<Self> {
        match value {
            ComponentValue::Nameplate(nameplate) => Some(nameplate),
            _ => None,
        }
    }

    fn into_value(self) -> ComponentValue {
        ComponentValue::Nameplate(self)
    }

    fn host_clone(&self) -> Option<Self> {
        Some(self.clone())
    }

    fn copy_fields_from(&mut self, source: &Self) -> bool {
        self.text.clone_from(&source.text);
        true
    }
}

impl From<UiComponentList> for ComponentValue {
    fn from(list: UiComponentList) -> Self {
        list.into_value()
    }
}

impl From<Nameplate> for ComponentValue {
    fn from(nameplate: Nameplate) -> Self {
        nameplate.into_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_round_trip_keeps_type() {
        let value: ComponentValue = UiComponentList::new([1, 2]).into();
        assert_eq!(value.component_type(), ComponentType::UiComponentList);
        assert!(Nameplate::from_value(value.clone()).is_none());
        assert_eq!(
            UiComponentList::from_value(value).unwrap().ids(),
            Some(&[1, 2][..])
        );
    }

    #[test]
    fn test_unset_ids() {
        assert_eq!(UiComponentList::default().ids(), None);
        assert_eq!(UiComponentList::new(Vec::new()).ids(), Some(&[][..]));
    }
}
