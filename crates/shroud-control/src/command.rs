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

//! The `/hid` command.

use std::sync::{Arc, Weak};

use shroud_core::host::{CommandHandler, CommandSender};
use shroud_core::{HostError, ADMIN_PERMISSION, DISPLAY_NAME, LOG_PREFIX};

use crate::dashboard::DashboardPage;
use crate::plugin::HideSettingsPlugin;

/// Root command name.
pub const COMMAND_NAME: &str = "hid";

/// `/hid help | info | reload | ui`.
///
/// `ui` also answers to `dashboard` and `gui`. Anything else prints the help.
pub struct HidCommand {
    plugin: Weak<HideSettingsPlugin>,
}

impl HidCommand {
    /// A command driving `plugin`.
    pub fn new(plugin: Weak<HideSettingsPlugin>) -> Self {
        Self { plugin }
    }

    fn running(&self, sender: &dyn CommandSender) -> Option<Arc<HideSettingsPlugin>> {
        let plugin = self.plugin.upgrade().filter(|plugin| plugin.is_active());
        if plugin.is_none() {
            sender.send_message(&format!("{DISPLAY_NAME} is not running."));
        }
        plugin
    }

    fn authorized(sender: &dyn CommandSender) -> bool {
        let allowed = sender.has_permission(ADMIN_PERMISSION);
        if !allowed {
            sender.send_message(&format!("No permission ({ADMIN_PERMISSION})"));
        }
        allowed
    }

    fn help(sender: &dyn CommandSender) {
        sender.send_message(&format!("{DISPLAY_NAME} commands:"));
        sender.send_message("  /hid info - show current settings");
        sender.send_message(&format!(
            "  /hid ui - open the settings dashboard (admin, permission: {ADMIN_PERMISSION})"
        ));
        sender.send_message("  /hid reload - reload config from disk (admin)");
    }

    fn info(&self, sender: &dyn CommandSender) {
        let Some(plugin) = self.running(sender) else {
            return;
        };
        let config = plugin.config();
        let gc = config.debug.baseline_gc;
        let lines = [
            DISPLAY_NAME.to_owned(),
            format!("  enabled: {}", config.enabled),
            format!("  players.hideHealthBar: {}", config.players.hide_health_bar),
            format!("  players.hideDamageNumbers: {}", config.players.hide_damage_numbers),
            format!("  players.hideNameplate: {}", config.players.hide_nameplate),
            format!("  npcs.hideHealthBar: {}", config.npcs.hide_health_bar),
            format!("  npcs.hideDamageNumbers: {}", config.npcs.hide_damage_numbers),
            format!("  map.hidePlayerMarkers: {}", config.map.hide_player_markers),
            format!("  debug.logRefreshStats: {}", config.debug.log_refresh_stats),
            format!(
                "  debug.baselineGc: enabled={} intervalSeconds={}",
                gc.enabled, gc.interval_seconds
            ),
            format!("  admin permission: {ADMIN_PERMISSION}"),
            "  open UI: /hid ui".to_owned(),
        ];
        for line in &lines {
            sender.send_message(line);
        }
    }

    fn reload(&self, sender: &dyn CommandSender) {
        if !Self::authorized(sender) {
            return;
        }
        let Some(plugin) = self.running(sender) else {
            return;
        };
        plugin.reload_config();
        plugin.coordinator().refresh_all();
        log::info!("{} Config reloaded by {}", LOG_PREFIX, sender.name());
        sender.send_message("Config reloaded and applied.");
    }

    fn open_ui(&self, sender: &dyn CommandSender) {
        if !Self::authorized(sender) {
            return;
        }
        let Some(plugin) = self.running(sender) else {
            return;
        };
        let page = Arc::new(DashboardPage::new(Arc::downgrade(&plugin)));
        match sender.open_page(page) {
            Ok(()) => {}
            Err(HostError::Unsupported(_)) => {
                sender.send_message("Only players can open the dashboard.");
            }
            Err(err) => sender.send_message(&format!("Failed to open UI: {err}")),
        }
    }
}

impl CommandHandler for HidCommand {
    fn name(&self) -> &str {
        COMMAND_NAME
    }

    fn description(&self) -> &str {
        "Server Hide Settings commands"
    }

    fn execute(&self, sender: &dyn CommandSender, args: &[&str]) {
        let sub = args.first().map(|word| word.to_ascii_lowercase());
        match sub.as_deref() {
            Some("info") => self.info(sender),
            Some("reload") => self.reload(sender),
            Some("ui" | "dashboard" | "gui") => self.open_ui(sender),
            _ => Self::help(sender),
        }
    }
}
