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

//! The plugin orchestrator.
//!
//! [`HideSettingsPlugin`] owns everything that lives for one plugin lifetime:
//! the published configuration, the engine slot the host-registered systems
//! read, the refresh coordinator, the map-marker controller and the background
//! jobs. The host drives it through `setup`, `start` and `shutdown`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{Context, Result};
use shroud_agents::{
    Engine, EngineSlot, MapMarkerController, NameplateChangeSystem, NameplateLifecycleSystem,
    ProbedCompat, RefreshCoordinator, UiListChangeSystem, UiListLifecycleSystem,
};
use shroud_core::host::{HostCompat, HostWorld, ServerHost};
use shroud_core::{HideConfig, LOG_PREFIX};
use shroud_data::ConfigRegistry;

use crate::background::BackgroundJobs;
use crate::command::HidCommand;
use crate::config_manager::ConfigManager;

/// Where the configuration lives unless told otherwise.
pub const DEFAULT_CONFIG_PATH: &str = "mods/ServerHideSettings/config.json";

/// Options fixed for the lifetime of the plugin.
#[derive(Debug, Clone)]
pub struct PluginOptions {
    /// Configuration file.
    pub config_path: PathBuf,
    /// How long shutdown waits for the worlds to run the final restore.
    pub shutdown_timeout: Duration,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl PluginOptions {
    /// Default options with another configuration file.
    pub fn with_config_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::default()
        }
    }
}

/// The hide-settings plugin.
pub struct HideSettingsPlugin {
    host: Arc<dyn ServerHost>,
    options: PluginOptions,
    config_file: ConfigManager,
    config: Arc<ConfigRegistry>,
    slot: Arc<EngineSlot>,
    engine: Arc<Engine>,
    coordinator: Arc<RefreshCoordinator>,
    markers: MapMarkerController,
    jobs: Mutex<BackgroundJobs>,
    updates: Mutex<()>,
    active: AtomicBool,
}

impl HideSettingsPlugin {
    /// Loads the configuration, registers systems, the `/hid` command and the
    /// world listener, then applies the configuration to everything loaded.
    pub fn setup(host: Arc<dyn ServerHost>, options: PluginOptions) -> Result<Arc<Self>> {
        log::info!("{} Setting up...", LOG_PREFIX);

        let config_file = ConfigManager::new(&options.config_path);
        let config = Arc::new(ConfigRegistry::new(config_file.load_or_create()));
        let compat: Arc<dyn HostCompat> = Arc::new(ProbedCompat::probe(host.as_ref()));
        let engine = Arc::new(Engine::new(
            Arc::clone(&host),
            Arc::clone(&compat),
            Arc::clone(&config),
        ));
        let slot = Arc::new(EngineSlot::new());
        slot.install(Arc::clone(&engine));

        let plugin = Arc::new(Self {
            coordinator: Arc::new(RefreshCoordinator::new(Arc::clone(&engine))),
            markers: MapMarkerController::new(compat),
            host,
            options,
            config_file,
            config,
            slot,
            engine,
            jobs: Mutex::new(BackgroundJobs::new()),
            updates: Mutex::new(()),
            active: AtomicBool::new(true),
        });

        plugin
            .register_systems()
            .context("failed to register ECS systems")?;
        if let Err(err) = plugin.register_command() {
            log::warn!("{} Failed to register commands: {:#}", LOG_PREFIX, err);
        }
        if let Err(err) = plugin.register_listeners() {
            log::warn!("{} Failed to register listeners: {:#}", LOG_PREFIX, err);
        }

        let snapshot = plugin.config();
        plugin.coordinator.refresh_all();
        plugin.markers.apply_to_all(plugin.host.as_ref(), &snapshot);
        plugin.restart_background_jobs();

        log::info!("{} Setup complete!", LOG_PREFIX);
        Ok(plugin)
    }

    fn register_systems(&self) -> Result<()> {
        self.host
            .register_ref_system(Arc::new(UiListLifecycleSystem::new(Arc::clone(&self.slot))))
            .context("UI-list lifecycle system")?;
        self.host
            .register_change_system(Arc::new(UiListChangeSystem::new(Arc::clone(&self.slot))))
            .context("UI-list change system")?;
        self.host
            .register_ref_system(Arc::new(NameplateLifecycleSystem::new(Arc::clone(&self.slot))))
            .context("nameplate lifecycle system")?;
        self.host
            .register_change_system(Arc::new(NameplateChangeSystem::new(Arc::clone(&self.slot))))
            .context("nameplate change system")?;
        log::info!("{} Registered override systems", LOG_PREFIX);
        Ok(())
    }

    fn register_command(self: &Arc<Self>) -> Result<()> {
        self.host
            .register_command(Arc::new(HidCommand::new(Arc::downgrade(self))))
            .context("/hid")?;
        log::info!("{} Registered /hid command", LOG_PREFIX);
        Ok(())
    }

    fn register_listeners(self: &Arc<Self>) -> Result<()> {
        let plugin = Arc::downgrade(self);
        self.host
            .on_world_added(Box::new(move |world: Arc<dyn HostWorld>| {
                if let Some(plugin) = plugin.upgrade() {
                    plugin.on_world_added(&world);
                }
            }))
            .context("world-added listener")?;
        log::debug!("{} Listeners registered", LOG_PREFIX);
        Ok(())
    }

    fn on_world_added(&self, world: &Arc<dyn HostWorld>) {
        if !self.is_active() {
            return;
        }
        log::debug!("{} Applying map settings to world {}", LOG_PREFIX, world.name());
        self.markers.apply_to_world(world, &self.config());
    }

    /// Start phase.
    pub fn start(&self) {
        log::info!("{} Started!", LOG_PREFIX);
        log::info!("{} Use /hid ui (admin) to open the in-game menu", LOG_PREFIX);
    }

    /// Undoes every override the plugin made and drops its state.
    ///
    /// Map providers go back first. The engine slot is cleared before the
    /// forced nameplate restore so the restore writes cannot re-enter the
    /// systems. Calling this twice is harmless.
    pub fn shutdown(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        log::info!("{} Shutting down...", LOG_PREFIX);

        self.jobs().stop();
        if let Err(err) = self.save_config() {
            log::warn!("{} Failed to persist config on shutdown: {:#}", LOG_PREFIX, err);
        }

        self.markers.restore_all(self.host.as_ref());
        self.slot.clear();
        self.coordinator.restore_nameplates();
        if !self.coordinator.wait_idle(self.options.shutdown_timeout) {
            log::warn!(
                "{} Worlds did not finish restoring within {:?}",
                LOG_PREFIX,
                self.options.shutdown_timeout
            );
        }
        self.engine.clear();
    }

    /// Re-reads the configuration file and applies what does not need an entity
    /// pass: map markers and background jobs.
    pub fn reload_config(&self) -> Arc<HideConfig> {
        let snapshot = self.config.publish(self.config_file.load_or_create());
        self.markers.apply_to_all(self.host.as_ref(), &snapshot);
        self.restart_background_jobs();
        log::info!("{} Config reloaded", LOG_PREFIX);
        snapshot
    }

    /// Changes a copy of the active configuration, persists it and publishes it.
    ///
    /// Nothing is refreshed; callers pick the narrowest refresh themselves.
    pub fn update_config(&self, change: impl FnOnce(&mut HideConfig)) -> Arc<HideConfig> {
        let _serialized = self.updates.lock().unwrap_or_else(|e| e.into_inner());
        let mut next = (*self.config.current()).clone();
        change(&mut next);
        next.normalize();
        if let Err(err) = self.config_file.save(&next) {
            log::warn!("{} Failed to save config: {}", LOG_PREFIX, err);
        }
        self.config.publish(next)
    }

    /// Republishes the active configuration and re-applies it everywhere.
    pub fn reapply(&self) {
        let snapshot = self.config.publish((*self.config.current()).clone());
        self.coordinator.refresh_all();
        self.markers.apply_to_all(self.host.as_ref(), &snapshot);
    }

    /// Writes the active configuration to disk.
    pub fn save_config(&self) -> Result<()> {
        self.config_file
            .save(&self.config.current())
            .with_context(|| format!("saving {}", self.config_file.path().display()))
    }

    fn restart_background_jobs(&self) {
        let snapshot = self.config();
        self.jobs()
            .restart(&snapshot.debug.baseline_gc, &self.coordinator);
    }

    fn jobs(&self) -> MutexGuard<'_, BackgroundJobs> {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The active configuration snapshot.
    pub fn config(&self) -> Arc<HideConfig> {
        self.config.current()
    }

    /// `false` once shut down.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// The host server.
    pub fn host(&self) -> &Arc<dyn ServerHost> {
        &self.host
    }

    /// Options the plugin was set up with.
    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    /// The engine, also after shutdown.
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// The slot the registered systems read. Empty after shutdown.
    pub fn slot(&self) -> &Arc<EngineSlot> {
        &self.slot
    }

    /// The refresh coordinator.
    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    /// The map-marker controller.
    pub fn markers(&self) -> &MapMarkerController {
        &self.markers
    }

    /// Interval of the running baseline sweep ticker, if any.
    pub fn baseline_gc_interval(&self) -> Option<Duration> {
        self.jobs().baseline_gc().map(|ticker| ticker.interval())
    }
}
