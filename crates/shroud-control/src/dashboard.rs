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

//! The in-game settings dashboard.

use std::sync::{Arc, Weak};

use shroud_core::host::{CommandSender, CustomPage, NotificationStyle, PageUpdate, PageView};
use shroud_core::{HideConfig, ADMIN_PERMISSION, DISPLAY_NAME, LOG_PREFIX};

use crate::plugin::HideSettingsPlugin;

/// Layout asset of the dashboard.
pub const LAYOUT: &str = "serverhidesettings/Dashboard.ui";

/// Selector of the status line.
pub const STATUS_SELECTOR: &str = "#StatusText.Text";

const REFRESH_BUTTON: &str = "#RefreshButton";
const CLOSE_BUTTON: &str = "#CloseButton";

/// What has to be re-applied after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Players,
    Npcs,
    Map,
}

/// One ON/OFF button of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// `players.hideHealthBar`
    PlayersHealth,
    /// `players.hideDamageNumbers`
    PlayersDamage,
    /// `players.hideNameplate`
    PlayersNameplate,
    /// `npcs.hideHealthBar`
    NpcsHealth,
    /// `npcs.hideDamageNumbers`
    NpcsDamage,
    /// `map.hidePlayerMarkers`
    MapPlayers,
}

impl Toggle {
    /// Every toggle, in display order.
    pub const ALL: [Toggle; 6] = [
        Toggle::PlayersHealth,
        Toggle::PlayersDamage,
        Toggle::PlayersNameplate,
        Toggle::NpcsHealth,
        Toggle::NpcsDamage,
        Toggle::MapPlayers,
    ];

    /// The toggle bound to `action`.
    pub fn from_action(action: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|toggle| toggle.action() == action)
    }

    /// Event tag the client sends.
    pub fn action(self) -> &'static str {
        match self {
            Toggle::PlayersHealth => "toggle_players_health",
            Toggle::PlayersDamage => "toggle_players_damage",
            Toggle::PlayersNameplate => "toggle_players_nameplate",
            Toggle::NpcsHealth => "toggle_npcs_health",
            Toggle::NpcsDamage => "toggle_npcs_damage",
            Toggle::MapPlayers => "toggle_map_players",
        }
    }

    /// Button selector.
    pub fn button(self) -> &'static str {
        match self {
            Toggle::PlayersHealth => "#TogglePlayersHealthButton",
            Toggle::PlayersDamage => "#TogglePlayersDamageButton",
            Toggle::PlayersNameplate => "#TogglePlayersNameplateButton",
            Toggle::NpcsHealth => "#ToggleNpcsHealthButton",
            Toggle::NpcsDamage => "#ToggleNpcsDamageButton",
            Toggle::MapPlayers => "#ToggleMapPlayersButton",
        }
    }

    /// Selector of the button label.
    pub fn label(self) -> String {
        format!("{}.Text", self.button())
    }

    /// Current value in `config`.
    pub fn get(self, config: &HideConfig) -> bool {
        match self {
            Toggle::PlayersHealth => config.players.hide_health_bar,
            Toggle::PlayersDamage => config.players.hide_damage_numbers,
            Toggle::PlayersNameplate => config.players.hide_nameplate,
            Toggle::NpcsHealth => config.npcs.hide_health_bar,
            Toggle::NpcsDamage => config.npcs.hide_damage_numbers,
            Toggle::MapPlayers => config.map.hide_player_markers,
        }
    }

    fn flag(self, config: &mut HideConfig) -> &mut bool {
        match self {
            Toggle::PlayersHealth => &mut config.players.hide_health_bar,
            Toggle::PlayersDamage => &mut config.players.hide_damage_numbers,
            Toggle::PlayersNameplate => &mut config.players.hide_nameplate,
            Toggle::NpcsHealth => &mut config.npcs.hide_health_bar,
            Toggle::NpcsDamage => &mut config.npcs.hide_damage_numbers,
            Toggle::MapPlayers => &mut config.map.hide_player_markers,
        }
    }

    fn scope(self) -> Scope {
        match self {
            Toggle::PlayersHealth | Toggle::PlayersDamage | Toggle::PlayersNameplate => {
                Scope::Players
            }
            Toggle::NpcsHealth | Toggle::NpcsDamage => Scope::Npcs,
            Toggle::MapPlayers => Scope::Map,
        }
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "ON"
    } else {
        "OFF"
    }
}

/// The dashboard page opened by `/hid ui`.
///
/// Mutations are checked server-side: a sender without the admin permission
/// gets a warning and nothing changes.
pub struct DashboardPage {
    plugin: Weak<HideSettingsPlugin>,
}

impl DashboardPage {
    /// A page driving `plugin`.
    pub fn new(plugin: Weak<HideSettingsPlugin>) -> Self {
        Self { plugin }
    }

    fn view(config: &HideConfig, status: &str) -> PageView {
        let mut view = PageView::new();
        for toggle in Toggle::ALL {
            view.set(&toggle.label(), on_off(toggle.get(config)));
        }
        view.set(STATUS_SELECTOR, status);
        view
    }

    fn apply(plugin: &HideSettingsPlugin, toggle: Toggle) -> Arc<HideConfig> {
        let config = plugin.update_config(|config| {
            let flag = toggle.flag(config);
            *flag = !*flag;
        });
        match toggle.scope() {
            Scope::Players => plugin.coordinator().refresh_players(),
            Scope::Npcs => plugin.coordinator().refresh_npcs(),
            Scope::Map => plugin.markers().apply_to_all(plugin.host().as_ref(), &config),
        }
        config
    }
}

impl CustomPage for DashboardPage {
    fn layout(&self) -> &str {
        LAYOUT
    }

    fn bindings(&self) -> Vec<(&'static str, &'static str)> {
        let mut bindings: Vec<_> = Toggle::ALL
            .into_iter()
            .map(|toggle| (toggle.button(), toggle.action()))
            .collect();
        bindings.push((REFRESH_BUTTON, "refresh"));
        bindings.push((CLOSE_BUTTON, "close"));
        bindings
    }

    fn build(&self) -> PageView {
        let config = match self.plugin.upgrade() {
            Some(plugin) => plugin.config(),
            None => Arc::new(HideConfig::default()),
        };
        Self::view(&config, "")
    }

    fn handle_event(&self, sender: &dyn CommandSender, action: &str) -> PageUpdate {
        if action == "close" {
            return PageUpdate::Close;
        }
        let Some(plugin) = self.plugin.upgrade().filter(|plugin| plugin.is_active()) else {
            return PageUpdate::None;
        };
        if !sender.has_permission(ADMIN_PERMISSION) {
            sender.notify(
                DISPLAY_NAME,
                &format!("No permission ({ADMIN_PERMISSION})"),
                NotificationStyle::Warning,
            );
            return PageUpdate::None;
        }

        if action == "refresh" {
            plugin.reapply();
            return PageUpdate::Update(Self::view(&plugin.config(), "Applied."));
        }
        let Some(toggle) = Toggle::from_action(action) else {
            log::debug!("{} Ignoring dashboard action '{}'", LOG_PREFIX, action);
            return PageUpdate::None;
        };

        let config = Self::apply(&plugin, toggle);
        log::info!(
            "{} {} set {:?} to {}",
            LOG_PREFIX,
            sender.name(),
            toggle,
            on_off(toggle.get(&config))
        );
        sender.notify(DISPLAY_NAME, "Saved and applied.", NotificationStyle::Success);
        PageUpdate::Update(Self::view(&config, "Saved and applied."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_action_maps_back_to_its_toggle() {
        for toggle in Toggle::ALL {
            assert_eq!(Toggle::from_action(toggle.action()), Some(toggle));
        }
        assert_eq!(Toggle::from_action("refresh"), None);
    }

    #[test]
    fn test_flag_targets_the_field_get_reads() {
        for toggle in Toggle::ALL {
            let mut config = HideConfig::default();
            let before = toggle.get(&config);
            *toggle.flag(&mut config) = !before;
            assert_eq!(toggle.get(&config), !before, "{toggle:?}");
        }
    }

    #[test]
    fn test_view_without_plugin_shows_defaults() {
        let page = DashboardPage::new(Weak::new());
        let view = page.build();
        assert_eq!(view.get("#TogglePlayersHealthButton.Text"), Some("ON"));
        assert_eq!(view.get("#ToggleMapPlayersButton.Text"), Some("OFF"));
        assert_eq!(view.get(STATUS_SELECTOR), Some(""));
        assert_eq!(page.bindings().len(), 8);
    }
}
