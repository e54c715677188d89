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

//! JSON persistence of the configuration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use shroud_core::{HideConfig, LOG_PREFIX};
use thiserror::Error;

/// Failures of the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file or its directory could not be read or written.
    #[error("config file {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The file exists but is not a valid configuration document.
    #[error("config file {path} is malformed: {source}")]
    Malformed {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },
    /// The configuration could not be encoded.
    #[error("failed to encode config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Reads and writes one configuration file.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// A manager for the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the managed file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses the file. `Ok(None)` if it does not exist.
    pub fn read(&self) -> Result<Option<HideConfig>, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let config: HideConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        Ok(Some(config.normalized()))
    }

    /// Loads the configuration, never failing.
    ///
    /// A missing file is created with the defaults. A malformed one is reset to
    /// the defaults and rewritten. Any other read error yields the defaults
    /// without touching the file.
    pub fn load_or_create(&self) -> HideConfig {
        match self.read() {
            Ok(Some(config)) => config,
            Ok(None) => {
                log::info!(
                    "{} No config at {}, writing defaults",
                    LOG_PREFIX,
                    self.path.display()
                );
                self.reset()
            }
            Err(err @ ConfigError::Malformed { .. }) => {
                log::warn!("{} {}. Resetting to defaults", LOG_PREFIX, err);
                self.reset()
            }
            Err(err) => {
                log::warn!(
                    "{} Failed to load config: {}. Using defaults (not persisted)",
                    LOG_PREFIX,
                    err
                );
                HideConfig::default().normalized()
            }
        }
    }

    fn reset(&self) -> HideConfig {
        let config = HideConfig::default().normalized();
        if let Err(err) = self.save(&config) {
            log::warn!("{} Failed to save config: {}", LOG_PREFIX, err);
        }
        config
    }

    /// Writes `config` to a sibling temporary file, then moves it over the
    /// managed file. Falls back to copying when the move is refused.
    pub fn save(&self, config: &HideConfig) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut json = serde_json::to_string_pretty(config)?;
        json.push('\n');

        let tmp = self.tmp_path();
        fs::write(&tmp, json).map_err(io_err)?;
        if let Err(err) = fs::rename(&tmp, &self.path) {
            log::debug!(
                "{} Atomic replace of {} failed ({}), copying instead",
                LOG_PREFIX,
                self.path.display(),
                err
            );
            let copied = fs::copy(&tmp, &self.path);
            let _ = fs::remove_file(&tmp);
            copied.map_err(io_err)?;
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "config.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().join("mods/ServerHideSettings/config.json"));

        let config = manager.load_or_create();

        assert_eq!(config, HideConfig::default());
        assert!(manager.path().exists(), "defaults must be persisted");
        assert_eq!(manager.read().unwrap(), Some(HideConfig::default()));
    }

    #[test]
    fn test_malformed_file_is_reset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ \"enabled\": fals").unwrap();
        let manager = ConfigManager::new(&path);

        assert!(matches!(manager.read(), Err(ConfigError::Malformed { .. })));
        let config = manager.load_or_create();

        assert_eq!(config, HideConfig::default());
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"hideHealthBar\""), "file must be rewritten: {text}");
    }

    #[test]
    fn test_partial_file_is_filled_and_clamped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "npcs": { "hideDamageNumbers": true }, "debug": { "baselineGc": { "enabled": true, "intervalSeconds": 1 } } }"#,
        )
        .unwrap();

        let config = ConfigManager::new(&path).load_or_create();

        assert!(config.enabled);
        assert!(config.npcs.hide_damage_numbers);
        assert!(config.npcs.hide_health_bar);
        assert!(config.debug.baseline_gc.enabled);
        assert_eq!(config.debug.baseline_gc.interval_seconds, 30);
    }

    #[test]
    fn test_negative_interval_keeps_other_settings_and_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let original = r#"{"enabled":false,"players":{"hideNameplate":true},"debug":{"baselineGc":{"enabled":true,"intervalSeconds":-5}}}"#;
        fs::write(&path, original).unwrap();

        let config = ConfigManager::new(&path).load_or_create();

        assert!(!config.enabled);
        assert!(config.players.hide_nameplate);
        assert!(config.debug.baseline_gc.enabled);
        assert_eq!(config.debug.baseline_gc.interval_seconds, 30);
        assert_eq!(fs::read_to_string(&path).unwrap(), original, "file must not be reset");
    }

    #[test]
    fn test_null_nested_object_keeps_global_switch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"enabled":false,"players":null}"#).unwrap();
        let manager = ConfigManager::new(&path);

        assert!(manager.read().is_ok());
        let config = manager.load_or_create();

        assert!(!config.enabled);
        assert!(config.players.hide_health_bar);
    }

    #[test]
    fn test_save_replaces_without_leaving_temp_file() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().join("config.json"));
        let mut config = HideConfig::default();
        config.map.hide_player_markers = true;

        manager.save(&HideConfig::default()).unwrap();
        manager.save(&config).unwrap();

        assert_eq!(manager.read().unwrap(), Some(config));
        assert!(!dir.path().join("config.json.tmp").exists());
    }

    #[test]
    fn test_unreadable_path_falls_back_without_persisting() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::create_dir(&path).unwrap();
        let manager = ConfigManager::new(&path);

        assert!(matches!(manager.read(), Err(ConfigError::Io { .. })));
        let config = manager.load_or_create();

        assert_eq!(config, HideConfig::default());
        assert!(path.is_dir(), "the directory must be left alone");
    }
}
