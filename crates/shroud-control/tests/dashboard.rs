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

mod common;

use std::sync::Arc;

use common::{admin, Fixture, COMBAT, HEALTH, OTHER};
use shroud_control::dashboard::STATUS_SELECTOR;
use shroud_core::host::map::PLAYER_ICONS_KEY;
use shroud_core::host::{CustomPage, NotificationStyle, PageUpdate, PageView};
use shroud_core::{HideConfig, DISPLAY_NAME};
use shroud_infra::{MemorySender, Notification};

fn open(fixture: &Fixture) -> Arc<dyn CustomPage> {
    let sender = admin();
    fixture.server.dispatch_command(&sender, "/hid ui");
    sender.last_page().expect("dashboard opened")
}

fn updated(update: PageUpdate) -> PageView {
    match update {
        PageUpdate::Update(view) => view,
        other => panic!("expected a view update, got {other:?}"),
    }
}

#[test]
fn test_build_shows_current_flags() {
    // --- 1. ARRANGE ---
    let fixture = Fixture::with_config(HideConfig::default());

    // --- 2. ACT ---
    let view = open(&fixture).build();

    // --- 3. ASSERT ---
    assert_eq!(view.get("#TogglePlayersHealthButton.Text"), Some("ON"));
    assert_eq!(view.get("#TogglePlayersDamageButton.Text"), Some("OFF"));
    assert_eq!(view.get("#TogglePlayersNameplateButton.Text"), Some("OFF"));
    assert_eq!(view.get("#ToggleNpcsHealthButton.Text"), Some("ON"));
    assert_eq!(view.get("#ToggleNpcsDamageButton.Text"), Some("OFF"));
    assert_eq!(view.get("#ToggleMapPlayersButton.Text"), Some("OFF"));
    assert_eq!(view.entries().len(), 7, "six toggles and the status line");
}

#[test]
fn test_toggle_without_permission_changes_nothing() {
    // --- 1. ARRANGE ---
    let fixture = Fixture::with_config(HideConfig::default());
    let page = open(&fixture);
    let intruder = MemorySender::player("Mallory");

    // --- 2. ACT ---
    let update = page.handle_event(&intruder, "toggle_players_health");

    // --- 3. ASSERT ---
    assert_eq!(update, PageUpdate::None);
    assert!(fixture.plugin.config().players.hide_health_bar);
    assert_eq!(
        intruder.notifications(),
        vec![Notification {
            title: DISPLAY_NAME.to_owned(),
            body: "No permission (serverhidesettings.admin)".to_owned(),
            style: NotificationStyle::Warning,
        }]
    );
}

#[test]
fn test_player_toggle_persists_and_refreshes_players() {
    // --- 1. ARRANGE ---
    let fixture = Fixture::with_config(HideConfig::default());
    let world = fixture.server.add_world("overworld").unwrap();
    let player = world.spawn_player("Alice", &[OTHER, HEALTH, COMBAT], None);
    let page = open(&fixture);
    let sender = admin();

    // --- 2. ACT ---
    let view = updated(page.handle_event(&sender, "toggle_players_damage"));

    // --- 3. ASSERT ---
    assert_eq!(view.get("#TogglePlayersDamageButton.Text"), Some("ON"));
    assert_eq!(view.get(STATUS_SELECTOR), Some("Saved and applied."));
    assert_eq!(world.store().ui_ids(player), Some(vec![OTHER]));
    assert!(fixture.saved_config().players.hide_damage_numbers);
    let last = sender.notifications().pop().expect("success notification");
    assert_eq!(last.style, NotificationStyle::Success);
}

#[test]
fn test_npc_toggle_posts_one_npc_pass() {
    // --- 1. ARRANGE ---
    let fixture = Fixture::with_config(HideConfig::default());
    let world = fixture.server.add_world("overworld").unwrap();
    let npc = world.spawn_npc(&[HEALTH, OTHER]);
    assert_eq!(world.store().ui_ids(npc), Some(vec![OTHER]));
    let page = open(&fixture);
    let posted = fixture.plugin.coordinator().tasks_posted();

    // --- 2. ACT ---
    updated(page.handle_event(&admin(), "toggle_npcs_health"));

    // --- 3. ASSERT ---
    assert_eq!(world.store().ui_ids(npc), Some(vec![HEALTH, OTHER]));
    assert_eq!(fixture.plugin.coordinator().tasks_posted(), posted + 1);
}

#[test]
fn test_nameplate_toggle_hides_and_restores() {
    // --- 1. ARRANGE ---
    let fixture = Fixture::with_config(HideConfig::default());
    let world = fixture.server.add_world("overworld").unwrap();
    let player = world.spawn_player("Alice", &[OTHER], Some("Alice"));
    let page = open(&fixture);
    let sender = admin();

    // --- 2. ACT ---
    page.handle_event(&sender, "toggle_players_nameplate");
    let hidden = world.store().nameplate_text(player);
    page.handle_event(&sender, "toggle_players_nameplate");

    // --- 3. ASSERT ---
    assert_eq!(hidden, None);
    assert_eq!(world.store().nameplate_text(player), Some("Alice".to_owned()));
}

#[test]
fn test_map_toggle_only_touches_markers() {
    // --- 1. ARRANGE ---
    let fixture = Fixture::with_config(HideConfig::default());
    let world = fixture.server.add_world("overworld").unwrap();
    let page = open(&fixture);
    let posted = fixture.plugin.coordinator().tasks_posted();

    // --- 2. ACT ---
    page.handle_event(&admin(), "toggle_map_players");
    let hidden = world.map().installed_name(PLAYER_ICONS_KEY);
    page.handle_event(&admin(), "toggle_map_players");

    // --- 3. ASSERT ---
    assert_eq!(hidden.as_deref(), Some("NoopPlayerIcons"));
    assert_eq!(
        world.map().installed_name(PLAYER_ICONS_KEY).as_deref(),
        Some("PlayerIconsProvider")
    );
    assert_eq!(fixture.plugin.coordinator().tasks_posted(), posted, "no entity pass");
}

#[test]
fn test_refresh_close_and_unknown_actions() {
    // --- 1. ARRANGE ---
    let fixture = Fixture::with_config(HideConfig::default());
    let page = open(&fixture);
    let before = fixture.plugin.config();

    // --- 2. ACT ---
    let refreshed = updated(page.handle_event(&admin(), "refresh"));
    let unknown = page.handle_event(&admin(), "self_destruct");
    let closed = page.handle_event(&MemorySender::player("Mallory"), "close");

    // --- 3. ASSERT ---
    assert_eq!(refreshed.get(STATUS_SELECTOR), Some("Applied."));
    assert_eq!(unknown, PageUpdate::None);
    assert_eq!(closed, PageUpdate::Close);
    assert_eq!(*fixture.plugin.config(), *before);
}
