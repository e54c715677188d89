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

//! Error types shared by every host-facing trait.

use thiserror::Error;

/// A failure reported by the host server.
///
/// The engine never lets these bubble up past an entity: any `HostError` on a
/// hot path means "skip this entity this tick".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The API does not exist on this host revision.
    #[error("host API not available: {0}")]
    Unsupported(&'static str),
    /// The entity reference no longer points at a live entity.
    #[error("entity reference is no longer valid")]
    InvalidReference,
    /// The store rejected a read or a write (usually a transient state).
    #[error("store failure: {0}")]
    Store(String),
    /// The world execution context refused the task.
    #[error("world executor failure: {0}")]
    Executor(String),
    /// The asset tables could not be read.
    #[error("asset failure: {0}")]
    Asset(String),
}

impl HostError {
    /// Returns `true` if the error means the API is missing rather than failing.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, HostError::Unsupported(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_is_detected() {
        assert!(HostError::Unsupported("execute").is_unsupported());
        assert!(!HostError::InvalidReference.is_unsupported());
        assert!(!HostError::Store("busy".into()).is_unsupported());
    }

    #[test]
    fn test_display_names_the_missing_api() {
        let msg = HostError::Unsupported("getNpcRefs").to_string();
        assert_eq!(msg, "host API not available: getNpcRefs");
    }
}
